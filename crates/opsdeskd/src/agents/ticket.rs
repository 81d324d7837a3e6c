//! Ticket CRUD agent.
//!
//! Mediates between an in-memory cache and the ticket store. The cache is an
//! optimization only: every mutation writes through to the store before it
//! is acknowledged, so the store stays authoritative even when the cache
//! drifts under concurrent access.

use crate::agent::{Agent, AgentReply, AgentRequest};
use crate::memory::MemoryLog;
use crate::store::TicketStore;
use async_trait::async_trait;
use opsdesk_shared::ticket::{Importance, Ticket, TicketStatus, UNKNOWN_ORIGIN};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub const TICKET_AGENT_NAME: &str = "Ticket Agent";

fn default_list_limit() -> usize {
    100
}

fn default_origin() -> String {
    UNKNOWN_ORIGIN.to_string()
}

/// Typed ticket operation
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TicketAction {
    Create {
        issue: String,
        #[serde(default)]
        importance: Importance,
        #[serde(default = "default_origin")]
        origin: String,
        #[serde(default)]
        auto_generated: bool,
    },
    List {
        #[serde(default = "default_list_limit")]
        limit: usize,
        #[serde(default)]
        offset: usize,
    },
    Get {
        ticket_id: String,
    },
    Delete {
        ticket_id: String,
    },
    Search {
        query: String,
    },
    UpdateStatus {
        ticket_id: String,
        status: TicketStatus,
    },
}

/// Result of a ticket operation.
///
/// Everything here, including not-found and validation rejections, is a
/// successful return rendered to a displayable string; only unexpected I/O
/// failures take the `StoreFailed` shape.
#[derive(Debug, Clone)]
pub enum TicketOutcome {
    Created { ticket: Ticket, message: String },
    Tickets(Vec<Ticket>),
    Found(Ticket),
    Updated(Ticket),
    Deleted { ticket_id: String },
    NotFound,
    Rejected(String),
    StoreFailed(String),
}

impl TicketOutcome {
    /// Render to the error-as-data string contract
    pub fn render(&self) -> String {
        match self {
            Self::Created { message, .. } => message.clone(),
            Self::Tickets(tickets) => {
                serde_json::to_string(tickets).unwrap_or_else(|_| "[]".to_string())
            }
            Self::Found(ticket) | Self::Updated(ticket) => {
                serde_json::to_string(ticket).unwrap_or_else(|_| "{}".to_string())
            }
            Self::Deleted { ticket_id } => {
                format!("Ticket {} deleted successfully", ticket_id)
            }
            Self::NotFound => "Ticket not found".to_string(),
            Self::Rejected(message) | Self::StoreFailed(message) => message.clone(),
        }
    }
}

/// Agent owning the ticket cache and store access
pub struct TicketAgent {
    store: Arc<dyn TicketStore>,
    cache: Mutex<HashMap<String, Ticket>>,
    memory: MemoryLog,
}

impl TicketAgent {
    /// Build the agent, preloading the cache from the store
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        let mut cache = HashMap::new();
        for ticket in store.list(default_list_limit(), 0) {
            cache.insert(ticket.ticket_id.clone(), ticket);
        }
        Self {
            store,
            cache: Mutex::new(cache),
            memory: MemoryLog::new(),
        }
    }

    pub fn execute(&self, action: TicketAction) -> TicketOutcome {
        match action {
            TicketAction::Create {
                issue,
                importance,
                origin,
                auto_generated,
            } => self.create(issue, importance, origin, auto_generated),
            TicketAction::List { limit, offset } => {
                TicketOutcome::Tickets(self.store.list(limit, offset))
            }
            TicketAction::Get { ticket_id } => self.get(&ticket_id),
            TicketAction::Delete { ticket_id } => self.delete(&ticket_id),
            TicketAction::Search { query } => self.search(&query),
            TicketAction::UpdateStatus { ticket_id, status } => {
                self.update_status(&ticket_id, status)
            }
        }
    }

    fn create(
        &self,
        issue: String,
        importance: Importance,
        origin: String,
        auto_generated: bool,
    ) -> TicketOutcome {
        if issue.trim().is_empty() {
            return TicketOutcome::Rejected("Issue description is required".to_string());
        }

        let ticket = Ticket::new(issue, importance, origin, auto_generated);
        if !self.store.save(&ticket) {
            warn!("Failed to persist ticket {}", ticket.ticket_id);
            return TicketOutcome::StoreFailed(format!(
                "Error saving ticket {} to storage",
                ticket.ticket_id
            ));
        }

        let message = format!("Ticket created successfully. Ticket ID: {}", ticket.ticket_id);
        self.cache_insert(ticket.clone());
        self.memory.push(json!({
            "type": "ticket_created",
            "ticket_id": ticket.ticket_id,
        }));
        info!("Created ticket {} (auto: {})", ticket.ticket_id, auto_generated);
        TicketOutcome::Created { ticket, message }
    }

    fn get(&self, ticket_id: &str) -> TicketOutcome {
        if let Some(ticket) = self.cache_lookup(ticket_id) {
            return TicketOutcome::Found(ticket);
        }
        match self.store.load(ticket_id) {
            Some(ticket) => {
                self.cache_insert(ticket.clone());
                TicketOutcome::Found(ticket)
            }
            None => TicketOutcome::NotFound,
        }
    }

    fn delete(&self, ticket_id: &str) -> TicketOutcome {
        let was_cached = self
            .cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(ticket_id)
            .is_some();

        if self.store.delete(ticket_id) {
            self.memory.push(json!({
                "type": "ticket_deleted",
                "ticket_id": ticket_id,
            }));
            return TicketOutcome::Deleted {
                ticket_id: ticket_id.to_string(),
            };
        }

        // Cached but not removable from storage is an I/O problem, not a
        // missing ticket
        if was_cached {
            TicketOutcome::StoreFailed(format!(
                "Error deleting ticket {} from storage",
                ticket_id
            ))
        } else {
            TicketOutcome::NotFound
        }
    }

    fn search(&self, query: &str) -> TicketOutcome {
        if query.trim().is_empty() {
            return TicketOutcome::Rejected("Search query is required".to_string());
        }
        TicketOutcome::Tickets(self.store.search(query))
    }

    fn update_status(&self, ticket_id: &str, status: TicketStatus) -> TicketOutcome {
        let mut ticket = match self.get(ticket_id) {
            TicketOutcome::Found(ticket) => ticket,
            other => return other,
        };

        ticket.status = status;
        if !self.store.save(&ticket) {
            return TicketOutcome::StoreFailed(format!(
                "Error saving ticket {} to storage",
                ticket_id
            ));
        }
        self.cache_insert(ticket.clone());
        self.memory.push(json!({
            "type": "ticket_updated",
            "ticket_id": ticket_id,
            "status": status,
        }));
        TicketOutcome::Updated(ticket)
    }

    fn cache_lookup(&self, ticket_id: &str) -> Option<Ticket> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(ticket_id)
            .cloned()
    }

    fn cache_insert(&self, ticket: Ticket) {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(ticket.ticket_id.clone(), ticket);
    }
}

#[async_trait]
impl Agent for TicketAgent {
    fn name(&self) -> &str {
        TICKET_AGENT_NAME
    }

    async fn process(&self, request: &AgentRequest) -> AgentReply {
        let action = match &request.params {
            Some(params) => match serde_json::from_value::<TicketAction>(params.clone()) {
                Ok(action) => action,
                Err(_) => return AgentReply::Failure("Invalid action".to_string()),
            },
            None => return AgentReply::Failure("Invalid action".to_string()),
        };

        AgentReply::Success(self.execute(action).render())
    }

    fn memory_depth(&self) -> usize {
        self.memory.depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FsTicketStore;
    use tempfile::TempDir;

    fn agent() -> (TicketAgent, TempDir, Arc<FsTicketStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FsTicketStore::new(dir.path()));
        (TicketAgent::new(store.clone()), dir, store)
    }

    fn create(agent: &TicketAgent, issue: &str) -> Ticket {
        match agent.execute(TicketAction::Create {
            issue: issue.to_string(),
            importance: Importance::Medium,
            origin: UNKNOWN_ORIGIN.to_string(),
            auto_generated: false,
        }) {
            TicketOutcome::Created { ticket, message } => {
                assert!(message.contains(&ticket.ticket_id));
                ticket
            }
            other => panic!("expected Created, got {:?}", other),
        }
    }

    #[test]
    fn test_create_then_get_roundtrip() {
        let (agent, _dir, _store) = agent();
        let created = create(&agent, "mouse double-clicks on single click");

        match agent.execute(TicketAction::Get {
            ticket_id: created.ticket_id.clone(),
        }) {
            TicketOutcome::Found(found) => assert_eq!(found, created),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_create_rejects_empty_issue() {
        let (agent, _dir, _store) = agent();
        let outcome = agent.execute(TicketAction::Create {
            issue: "   ".to_string(),
            importance: Importance::Low,
            origin: UNKNOWN_ORIGIN.to_string(),
            auto_generated: false,
        });
        assert!(matches!(outcome, TicketOutcome::Rejected(_)));
    }

    #[test]
    fn test_get_populates_cache_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FsTicketStore::new(dir.path()));

        // Written to the store after the agent's preload
        let agent = TicketAgent::new(store.clone());
        let ticket = Ticket::new("late arrival".into(), Importance::High, "1.2.3.4".into(), false);
        assert!(store.save(&ticket));

        match agent.execute(TicketAction::Get {
            ticket_id: ticket.ticket_id.clone(),
        }) {
            TicketOutcome::Found(found) => assert_eq!(found.issue, "late arrival"),
            other => panic!("expected Found, got {:?}", other),
        }
        assert!(agent.cache_lookup(&ticket.ticket_id).is_some());
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let (agent, _dir, _store) = agent();
        let outcome = agent.execute(TicketAction::Get {
            ticket_id: "ticket_missing".to_string(),
        });
        assert!(matches!(outcome, TicketOutcome::NotFound));
        assert_eq!(outcome.render(), "Ticket not found");
    }

    #[test]
    fn test_delete_cached_ticket() {
        let (agent, _dir, store) = agent();
        let created = create(&agent, "delete me");

        let outcome = agent.execute(TicketAction::Delete {
            ticket_id: created.ticket_id.clone(),
        });
        assert!(matches!(outcome, TicketOutcome::Deleted { .. }));
        assert!(store.load(&created.ticket_id).is_none());
    }

    #[test]
    fn test_delete_store_only_ticket() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FsTicketStore::new(dir.path()));
        let agent = TicketAgent::new(store.clone());

        // Exists on disk, never cached by this agent
        let ticket = Ticket::new("uncached".into(), Importance::Medium, UNKNOWN_ORIGIN.into(), false);
        assert!(store.save(&ticket));

        let outcome = agent.execute(TicketAction::Delete {
            ticket_id: ticket.ticket_id.clone(),
        });
        assert!(matches!(outcome, TicketOutcome::Deleted { .. }));
        assert!(store.load(&ticket.ticket_id).is_none());
    }

    #[test]
    fn test_delete_missing_everywhere() {
        let (agent, _dir, _store) = agent();
        let outcome = agent.execute(TicketAction::Delete {
            ticket_id: "ticket_ghost".to_string(),
        });
        assert!(matches!(outcome, TicketOutcome::NotFound));
    }

    #[test]
    fn test_search_empty_query_rejected() {
        let (agent, _dir, _store) = agent();
        let outcome = agent.execute(TicketAction::Search {
            query: "".to_string(),
        });
        match outcome {
            TicketOutcome::Rejected(message) => {
                assert_eq!(message, "Search query is required")
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_search_no_match_is_empty_success() {
        let (agent, _dir, _store) = agent();
        create(&agent, "printer jam in building 4");

        match agent.execute(TicketAction::Search {
            query: "nonexistent-string-xyz".to_string(),
        }) {
            TicketOutcome::Tickets(tickets) => assert!(tickets.is_empty()),
            other => panic!("expected Tickets, got {:?}", other),
        }
    }

    #[test]
    fn test_list_newest_first() {
        let (agent, _dir, _store) = agent();
        create(&agent, "first");
        let second = create(&agent, "second");

        match agent.execute(TicketAction::List { limit: 1, offset: 0 }) {
            TicketOutcome::Tickets(tickets) => {
                assert_eq!(tickets.len(), 1);
                assert_eq!(tickets[0].ticket_id, second.ticket_id);
            }
            other => panic!("expected Tickets, got {:?}", other),
        }
    }

    #[test]
    fn test_update_status_writes_through() {
        let (agent, _dir, store) = agent();
        let created = create(&agent, "needs triage");

        match agent.execute(TicketAction::UpdateStatus {
            ticket_id: created.ticket_id.clone(),
            status: TicketStatus::Resolved,
        }) {
            TicketOutcome::Updated(updated) => {
                assert_eq!(updated.status, TicketStatus::Resolved);
                assert_eq!(updated.created_at, created.created_at);
            }
            other => panic!("expected Updated, got {:?}", other),
        }

        let persisted = store.load(&created.ticket_id).unwrap();
        assert_eq!(persisted.status, TicketStatus::Resolved);
    }

    #[tokio::test]
    async fn test_process_parses_action_params() {
        let (agent, _dir, _store) = agent();

        let request = AgentRequest {
            params: Some(json!({
                "action": "create",
                "issue": "via process",
            })),
            ..Default::default()
        };
        let reply = agent.process(&request).await;
        assert!(reply.text().starts_with("Ticket created successfully. Ticket ID: "));
    }

    #[tokio::test]
    async fn test_process_without_params_is_invalid_action() {
        let (agent, _dir, _store) = agent();
        let reply = agent.process(&AgentRequest::text("hello", "unknown")).await;
        assert_eq!(reply.text(), "Invalid action");
    }
}
