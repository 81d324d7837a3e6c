//! Opsdesk Daemon - multi-agent support desk
//!
//! Routes support queries to capability agents, auto-detects reported
//! issues, and keeps tickets in file-backed storage.

use anyhow::Result;
use opsdeskd::agents::{TextAgent, TicketAgent, VisionAgent};
use opsdeskd::config::Config;
use opsdeskd::coordinator::Coordinator;
use opsdeskd::detector::IssueDetector;
use opsdeskd::llm::OpenRouterClient;
use opsdeskd::server::{self, AppState};
use opsdeskd::store::FsTicketStore;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Opsdesk Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;

    let store = Arc::new(FsTicketStore::new(&config.storage.data_dir));
    let backend = Arc::new(OpenRouterClient::from_config(&config.llm));

    let ticket_agent = Arc::new(TicketAgent::new(store));
    let coordinator = Coordinator::new(
        Arc::new(VisionAgent::new(backend.clone())),
        Arc::new(TextAgent::new(backend)),
        ticket_agent.clone(),
        IssueDetector::new(),
    );

    let state = AppState::new(coordinator, ticket_agent);
    server::run(state, &config.server.listen_addr).await
}
