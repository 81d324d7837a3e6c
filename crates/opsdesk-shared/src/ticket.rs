//! Ticket types for the support desk workflow.
//!
//! A ticket is one persisted record describing a support issue. Tickets come
//! from two paths: explicit creation over the API, or auto-detection when a
//! text query looks like a problem report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Origin recorded when the requester address is unavailable
pub const UNKNOWN_ORIGIN: &str = "unknown";

/// Ticket importance level
///
/// Auto-classification only ever assigns `Medium` and above; `Low` is
/// reachable solely through explicit creation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Ticket lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Ticket created, nobody working on it yet
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Resolved => write!(f, "resolved"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// A support ticket
///
/// `ticket_id` and `created_at` are assigned once at construction and never
/// change afterwards; the only mutable field is `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique ticket ID (`ticket_` + UUID)
    pub ticket_id: String,
    /// Free-text issue description
    pub issue: String,
    pub importance: Importance,
    pub status: TicketStatus,
    /// Requester network address at creation time, best effort
    pub origin: String,
    /// True when created by the issue-detection path rather than a user
    #[serde(default)]
    pub auto_generated: bool,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Create a new open ticket with a fresh ID and timestamp
    pub fn new(issue: String, importance: Importance, origin: String, auto_generated: bool) -> Self {
        Self {
            ticket_id: format!("ticket_{}", Uuid::new_v4().simple()),
            issue,
            importance,
            status: TicketStatus::Open,
            origin,
            auto_generated,
            created_at: Utc::now(),
        }
    }
}
