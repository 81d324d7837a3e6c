//! Wire types for the opsdesk HTTP surface.
//!
//! Shared between the daemon's route handlers and the CLI client so both
//! sides agree on field names. Ticket operations use a `status:
//! success|error` envelope; query operations return the coordinator outcome
//! directly.

use crate::ticket::{Importance, Ticket, TicketStatus};
use serde::{Deserialize, Serialize};

/// Request kind routed by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    #[default]
    Text,
    Vision,
    /// Anything else fans out to every capability agent
    #[serde(other)]
    Other,
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Vision => write!(f, "vision"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Generic query request (`POST /v1/query`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub prompt: String,
    #[serde(default)]
    pub kind: QueryKind,
    /// Base64-encoded image payload for vision queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

/// Text-only query request (`POST /v1/text`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRequest {
    pub prompt: String,
}

/// Vision query request (`POST /v1/vision`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionRequest {
    /// Defaults to "Describe this image" when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub image_base64: String,
}

/// Outcome of the auto-ticket side channel
///
/// `created` is false when the detector fired but persisting the ticket
/// failed; the failure never surfaces as an error to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoTicket {
    pub created: bool,
    pub message: String,
    pub issue: String,
    pub importance: Importance,
}

/// Coordinator response for all query endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_ticket: Option<AutoTicket>,
}

/// Explicit ticket creation request (`POST /v1/tickets`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub issue: String,
    #[serde(default)]
    pub importance: Importance,
}

/// Status update request (`POST /v1/tickets/{id}/status`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TicketStatus,
}

/// Envelope for ticket mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketMessageResponse {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
}

impl TicketMessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            ticket_id: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            ticket_id: None,
        }
    }

    pub fn with_ticket_id(mut self, ticket_id: impl Into<String>) -> Self {
        self.ticket_id = Some(ticket_id.into());
        self
    }
}

/// Envelope for list and search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketListResponse {
    pub status: String,
    pub tickets: Vec<Ticket>,
}

/// Envelope for a single ticket lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketResponse {
    pub status: String,
    pub ticket: Ticket,
}

/// Daemon health (`GET /v1/health`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// One handler's introspection entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    pub memory_depth: usize,
}

/// Handler roster (`GET /v1/agents`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsResponse {
    pub agents: Vec<AgentInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_kind_default_is_text() {
        let req: QueryRequest = serde_json::from_str(r#"{"prompt": "hi"}"#).unwrap();
        assert_eq!(req.kind, QueryKind::Text);
    }

    #[test]
    fn test_query_kind_unknown_maps_to_other() {
        let req: QueryRequest =
            serde_json::from_str(r#"{"prompt": "hi", "kind": "composite"}"#).unwrap();
        assert_eq!(req.kind, QueryKind::Other);
    }

    #[test]
    fn test_auto_ticket_omitted_when_absent() {
        let resp = QueryResponse {
            response: "ok".to_string(),
            auto_ticket: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("auto_ticket"));
    }

    #[test]
    fn test_create_request_importance_defaults_medium() {
        let req: CreateTicketRequest =
            serde_json::from_str(r#"{"issue": "vpn is down"}"#).unwrap();
        assert_eq!(req.importance, Importance::Medium);
    }
}
