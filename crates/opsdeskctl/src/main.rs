//! Opsdesk Control - CLI client for the opsdesk daemon

mod client;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::DaemonClient;

#[derive(Parser)]
#[command(name = "opsdeskctl")]
#[command(about = "Opsdesk - multi-agent support desk", long_about = None)]
#[command(version)]
struct Cli {
    /// Daemon base URL
    #[arg(long, env = "OPSDESK_SERVER", default_value = "http://127.0.0.1:7810")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show daemon health
    Status,

    /// Ask the support desk a question
    Ask {
        /// Question text
        prompt: Vec<String>,
    },

    /// Describe an image file
    Vision {
        /// Path to the image file
        image: std::path::PathBuf,

        /// Question about the image
        #[arg(long)]
        prompt: Option<String>,
    },

    /// Show the agent roster
    Agents,

    /// Manage tickets
    #[command(subcommand)]
    Ticket(TicketCommands),
}

#[derive(Subcommand)]
enum TicketCommands {
    /// Open a new ticket
    Create {
        /// Issue description
        issue: Vec<String>,

        /// low, medium, high or critical
        #[arg(long, default_value = "medium")]
        importance: String,
    },

    /// List tickets, newest first
    List {
        #[arg(long, default_value_t = 100)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Show one ticket
    Get { ticket_id: String },

    /// Delete a ticket
    Delete { ticket_id: String },

    /// Search tickets by substring
    Search { query: String },

    /// Change a ticket's status
    Status {
        ticket_id: String,

        /// open, in_progress, resolved or closed
        status: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::new(cli.server);

    match cli.command {
        Commands::Status => commands::status(&client).await,
        Commands::Ask { prompt } => commands::ask(&client, prompt.join(" ")).await,
        Commands::Vision { image, prompt } => commands::vision(&client, &image, prompt).await,
        Commands::Agents => commands::agents(&client).await,
        Commands::Ticket(ticket) => match ticket {
            TicketCommands::Create { issue, importance } => {
                commands::ticket_create(&client, issue.join(" "), &importance).await
            }
            TicketCommands::List { limit, offset } => {
                commands::ticket_list(&client, limit, offset).await
            }
            TicketCommands::Get { ticket_id } => commands::ticket_get(&client, &ticket_id).await,
            TicketCommands::Delete { ticket_id } => {
                commands::ticket_delete(&client, &ticket_id).await
            }
            TicketCommands::Search { query } => commands::ticket_search(&client, &query).await,
            TicketCommands::Status { ticket_id, status } => {
                commands::ticket_status(&client, &ticket_id, &status).await
            }
        },
    }
}
