//! API routes for opsdeskd
//!
//! Query endpoints return the coordinator outcome directly; ticket endpoints
//! use a `status: success|error` envelope. The requester's address becomes
//! the ticket origin, with `unknown` standing in when the connection info is
//! unavailable.

use crate::agents::{TicketAction, TicketOutcome};
use crate::server::AppState;
use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use opsdesk_shared::{
    api::{
        AgentsResponse, CreateTicketRequest, HealthResponse, QueryKind, QueryRequest,
        QueryResponse, TextRequest, TicketListResponse, TicketMessageResponse, TicketResponse,
        UpdateStatusRequest, VisionRequest,
    },
    ticket::UNKNOWN_ORIGIN,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::agent::AgentRequest;

type AppStateArc = Arc<AppState>;

fn origin_of(connect: Option<ConnectInfo<SocketAddr>>) -> String {
    connect
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_ORIGIN.to_string())
}

fn decode_image(encoded: &str) -> Result<Vec<u8>, (StatusCode, String)> {
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Invalid base64 image payload: {}", e),
            )
        })
}

// ============================================================================
// Query Routes
// ============================================================================

pub fn query_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/query", post(query))
        .route("/v1/text", post(text_query))
        .route("/v1/vision", post(vision_query))
}

async fn query(
    State(state): State<AppStateArc>,
    connect: Option<ConnectInfo<SocketAddr>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, String)> {
    let origin = origin_of(connect);
    info!("Query ({}) from {}", req.kind, origin);

    let mut request = AgentRequest::text(req.prompt, origin);
    if let Some(encoded) = &req.image_base64 {
        request.image = Some(decode_image(encoded)?);
    }

    Ok(Json(state.coordinator.handle(req.kind, request).await))
}

async fn text_query(
    State(state): State<AppStateArc>,
    connect: Option<ConnectInfo<SocketAddr>>,
    Json(req): Json<TextRequest>,
) -> Json<QueryResponse> {
    let request = AgentRequest::text(req.prompt, origin_of(connect));
    Json(state.coordinator.handle(QueryKind::Text, request).await)
}

async fn vision_query(
    State(state): State<AppStateArc>,
    connect: Option<ConnectInfo<SocketAddr>>,
    Json(req): Json<VisionRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, String)> {
    let image = decode_image(&req.image_base64)?;
    let request = AgentRequest::vision(
        req.prompt.unwrap_or_default(),
        image,
        origin_of(connect),
    );
    Ok(Json(state.coordinator.handle(QueryKind::Vision, request).await))
}

// ============================================================================
// Ticket Routes
// ============================================================================

pub fn ticket_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/tickets", post(create_ticket).get(list_tickets))
        .route("/v1/tickets/search", get(search_tickets))
        .route("/v1/tickets/:ticket_id", get(get_ticket).delete(delete_ticket))
        .route("/v1/tickets/:ticket_id/status", post(update_ticket_status))
}

type TicketError = (StatusCode, Json<TicketMessageResponse>);

fn ticket_error(status: StatusCode, message: impl Into<String>) -> TicketError {
    (status, Json(TicketMessageResponse::error(message)))
}

async fn create_ticket(
    State(state): State<AppStateArc>,
    connect: Option<ConnectInfo<SocketAddr>>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<Json<TicketMessageResponse>, TicketError> {
    let outcome = state.tickets.execute(TicketAction::Create {
        issue: req.issue,
        importance: req.importance,
        origin: origin_of(connect),
        auto_generated: false,
    });

    match outcome {
        TicketOutcome::Created { ticket, message } => {
            Ok(Json(TicketMessageResponse::success(message).with_ticket_id(ticket.ticket_id)))
        }
        TicketOutcome::Rejected(message) => {
            Err(ticket_error(StatusCode::BAD_REQUEST, message))
        }
        other => Err(ticket_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            other.render(),
        )),
    }
}

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    offset: usize,
}

fn default_limit() -> usize {
    100
}

async fn list_tickets(
    State(state): State<AppStateArc>,
    Query(params): Query<ListParams>,
) -> Json<TicketListResponse> {
    let tickets = match state.tickets.execute(TicketAction::List {
        limit: params.limit,
        offset: params.offset,
    }) {
        TicketOutcome::Tickets(tickets) => tickets,
        _ => Vec::new(),
    };
    Json(TicketListResponse {
        status: "success".to_string(),
        tickets,
    })
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: String,
}

async fn search_tickets(
    State(state): State<AppStateArc>,
    Query(params): Query<SearchParams>,
) -> Result<Json<TicketListResponse>, TicketError> {
    // Single characters match too much of the serialized form to be useful
    if params.q.trim().chars().count() < 2 {
        return Err(ticket_error(
            StatusCode::BAD_REQUEST,
            "Search query must be at least 2 characters",
        ));
    }

    match state.tickets.execute(TicketAction::Search { query: params.q }) {
        TicketOutcome::Tickets(tickets) => Ok(Json(TicketListResponse {
            status: "success".to_string(),
            tickets,
        })),
        other => Err(ticket_error(StatusCode::BAD_REQUEST, other.render())),
    }
}

async fn get_ticket(
    State(state): State<AppStateArc>,
    Path(ticket_id): Path<String>,
) -> Result<Json<TicketResponse>, TicketError> {
    match state.tickets.execute(TicketAction::Get { ticket_id }) {
        TicketOutcome::Found(ticket) => Ok(Json(TicketResponse {
            status: "success".to_string(),
            ticket,
        })),
        other => Err(ticket_error(StatusCode::NOT_FOUND, other.render())),
    }
}

async fn delete_ticket(
    State(state): State<AppStateArc>,
    Path(ticket_id): Path<String>,
) -> Result<Json<TicketMessageResponse>, TicketError> {
    match state.tickets.execute(TicketAction::Delete { ticket_id }) {
        TicketOutcome::Deleted { ticket_id } => {
            let message = format!("Ticket {} deleted successfully", ticket_id);
            Ok(Json(TicketMessageResponse::success(message).with_ticket_id(ticket_id)))
        }
        TicketOutcome::NotFound => Err(ticket_error(StatusCode::NOT_FOUND, "Ticket not found")),
        other => Err(ticket_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            other.render(),
        )),
    }
}

async fn update_ticket_status(
    State(state): State<AppStateArc>,
    Path(ticket_id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<TicketResponse>, TicketError> {
    match state.tickets.execute(TicketAction::UpdateStatus {
        ticket_id,
        status: req.status,
    }) {
        TicketOutcome::Updated(ticket) => Ok(Json(TicketResponse {
            status: "success".to_string(),
            ticket,
        })),
        TicketOutcome::NotFound => Err(ticket_error(StatusCode::NOT_FOUND, "Ticket not found")),
        other => Err(ticket_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            other.render(),
        )),
    }
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/agents", get(agents))
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

async fn agents(State(state): State<AppStateArc>) -> Json<AgentsResponse> {
    Json(AgentsResponse {
        agents: state.coordinator.agents_info(),
    })
}
