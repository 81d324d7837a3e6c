//! Command implementations for opsdeskctl.

use crate::client::DaemonClient;
use anyhow::{bail, Result};
use opsdesk_shared::ticket::{Importance, Ticket, TicketStatus};
use opsdesk_shared::ui::{self, colors, print_err, print_header, print_kv, print_ok};
use std::path::Path;

fn parse_importance(value: &str) -> Result<Importance> {
    match value.to_lowercase().as_str() {
        "low" => Ok(Importance::Low),
        "medium" => Ok(Importance::Medium),
        "high" => Ok(Importance::High),
        "critical" => Ok(Importance::Critical),
        other => bail!(
            "Unknown importance '{}'. Use low, medium, high or critical",
            other
        ),
    }
}

fn parse_status(value: &str) -> Result<TicketStatus> {
    match value.to_lowercase().as_str() {
        "open" => Ok(TicketStatus::Open),
        "in_progress" => Ok(TicketStatus::InProgress),
        "resolved" => Ok(TicketStatus::Resolved),
        "closed" => Ok(TicketStatus::Closed),
        other => bail!(
            "Unknown status '{}'. Use open, in_progress, resolved or closed",
            other
        ),
    }
}

fn print_ticket_line(ticket: &Ticket) {
    let importance = ticket.importance.to_string();
    let marker = if ticket.auto_generated { " (auto)" } else { "" };
    println!(
        "  {} {}{:<8}{} {:<11} {}{}",
        ticket.ticket_id,
        ui::importance_color(&importance),
        importance,
        colors::RESET,
        ticket.status,
        ticket.issue,
        marker,
    );
}

fn print_ticket_detail(ticket: &Ticket) {
    print_kv("ID", &ticket.ticket_id, 12);
    print_kv("Issue", &ticket.issue, 12);
    print_kv("Importance", &ticket.importance.to_string(), 12);
    print_kv("Status", &ticket.status.to_string(), 12);
    print_kv("Origin", &ticket.origin, 12);
    print_kv("Auto", if ticket.auto_generated { "yes" } else { "no" }, 12);
    print_kv(
        "Created",
        &ticket.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        12,
    );
}

pub async fn status(client: &DaemonClient) -> Result<()> {
    print_header("opsdesk", env!("CARGO_PKG_VERSION"));

    match client.health().await {
        Ok(health) => {
            print_ok(&format!("Daemon {} ({})", health.status, health.version));
            print_kv("Uptime", &format!("{}s", health.uptime_seconds), 12);
        }
        Err(e) => {
            print_err(&format!("Daemon unreachable: {}", e));
        }
    }
    Ok(())
}

pub async fn ask(client: &DaemonClient, prompt: String) -> Result<()> {
    if prompt.trim().is_empty() {
        bail!("Nothing to ask");
    }

    let reply = client.ask(prompt).await?;
    println!("{}", reply.response);

    if let Some(auto) = reply.auto_ticket {
        println!();
        if auto.created {
            print_ok(&auto.message);
        } else {
            print_err(&auto.message);
        }
    }
    Ok(())
}

pub async fn vision(client: &DaemonClient, image: &Path, prompt: Option<String>) -> Result<()> {
    use base64::Engine;

    let bytes = std::fs::read(image)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", image.display(), e))?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

    let reply = client.vision(prompt, encoded).await?;
    println!("{}", reply.response);
    Ok(())
}

pub async fn agents(client: &DaemonClient) -> Result<()> {
    print_header("opsdesk agents", env!("CARGO_PKG_VERSION"));

    let roster = client.agents().await?;
    for agent in roster.agents {
        print_kv(&agent.name, &format!("{} memory entries", agent.memory_depth), 24);
    }
    Ok(())
}

pub async fn ticket_create(client: &DaemonClient, issue: String, importance: &str) -> Result<()> {
    let importance = parse_importance(importance)?;
    let created = client.create_ticket(issue, importance).await?;
    print_ok(&created.message);
    Ok(())
}

pub async fn ticket_list(client: &DaemonClient, limit: usize, offset: usize) -> Result<()> {
    let list = client.list_tickets(limit, offset).await?;
    if list.tickets.is_empty() {
        println!("No tickets");
        return Ok(());
    }
    for ticket in &list.tickets {
        print_ticket_line(ticket);
    }
    Ok(())
}

pub async fn ticket_get(client: &DaemonClient, ticket_id: &str) -> Result<()> {
    let found = client.get_ticket(ticket_id).await?;
    print_ticket_detail(&found.ticket);
    Ok(())
}

pub async fn ticket_delete(client: &DaemonClient, ticket_id: &str) -> Result<()> {
    let deleted = client.delete_ticket(ticket_id).await?;
    print_ok(&deleted.message);
    Ok(())
}

pub async fn ticket_search(client: &DaemonClient, query: &str) -> Result<()> {
    let hits = client.search_tickets(query).await?;
    if hits.tickets.is_empty() {
        println!("No matching tickets");
        return Ok(());
    }
    for ticket in &hits.tickets {
        print_ticket_line(ticket);
    }
    Ok(())
}

pub async fn ticket_status(client: &DaemonClient, ticket_id: &str, status: &str) -> Result<()> {
    let status = parse_status(status)?;
    let updated = client.update_status(ticket_id, status).await?;
    print_ok(&format!(
        "Ticket {} is now {}",
        updated.ticket.ticket_id, updated.ticket.status
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_importance() {
        assert_eq!(parse_importance("CRITICAL").unwrap(), Importance::Critical);
        assert_eq!(parse_importance("medium").unwrap(), Importance::Medium);
        assert!(parse_importance("urgent").is_err());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("in_progress").unwrap(), TicketStatus::InProgress);
        assert!(parse_status("done").is_err());
    }
}
