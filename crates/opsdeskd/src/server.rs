//! HTTP server for opsdeskd

use crate::agents::TicketAgent;
use crate::coordinator::Coordinator;
use crate::routes;
use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub coordinator: Coordinator,
    /// Direct handle for the ticket endpoints; the coordinator shares it
    pub tickets: Arc<TicketAgent>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(coordinator: Coordinator, tickets: Arc<TicketAgent>) -> Self {
        Self {
            coordinator,
            tickets,
            start_time: Instant::now(),
        }
    }
}

/// Router over all route groups
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::query_routes())
        .merge(routes::ticket_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server
pub async fn run(state: AppState, listen_addr: &str) -> Result<()> {
    let app = app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!("Listening on http://{}", listen_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
