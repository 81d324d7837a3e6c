//! Request coordinator.
//!
//! Single entry point for query traffic: routes each request to the right
//! capability agent, runs the issue detector over text input, and opens
//! tickets for detected issues on a side channel that never fails the
//! primary response.

use crate::agent::{Agent, AgentRequest};
use crate::agents::{TextAgent, TicketAction, TicketAgent, TicketOutcome, VisionAgent};
use crate::detector::IssueDetector;
use crate::memory::MemoryLog;
use opsdesk_shared::api::{AgentInfo, AutoTicket, QueryKind, QueryResponse};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const COORDINATOR_AGENT_NAME: &str = "Coordinator Agent";
pub const DETECTOR_AGENT_NAME: &str = "Issue Detection Agent";

/// Routes requests across the agent roster
pub struct Coordinator {
    vision: Arc<VisionAgent>,
    text: Arc<TextAgent>,
    ticket: Arc<TicketAgent>,
    detector: IssueDetector,
    memory: MemoryLog,
}

impl Coordinator {
    pub fn new(
        vision: Arc<VisionAgent>,
        text: Arc<TextAgent>,
        ticket: Arc<TicketAgent>,
        detector: IssueDetector,
    ) -> Self {
        Self {
            vision,
            text,
            ticket,
            detector,
            memory: MemoryLog::new(),
        }
    }

    pub fn ticket_agent(&self) -> &TicketAgent {
        &self.ticket
    }

    /// Dispatch one query and merge the results.
    ///
    /// Text queries also pass through the issue detector; a hit opens an
    /// auto-generated ticket reported alongside the primary response.
    pub async fn handle(&self, kind: QueryKind, request: AgentRequest) -> QueryResponse {
        debug!("Coordinating {} request from {}", kind, request.origin);

        let auto_ticket = match kind {
            QueryKind::Text => self.auto_ticket(&request).await,
            _ => None,
        };

        let response = match kind {
            QueryKind::Text => self.text.process(&request).await.text().to_string(),
            QueryKind::Vision => self.vision.process(&request).await.text().to_string(),
            QueryKind::Other => self.fan_out(&request).await,
        };

        self.memory.push(json!({
            "type": "coordination",
            "query_type": kind,
            "response": response,
            "auto_ticket": auto_ticket.as_ref().map(|t| t.created),
        }));

        QueryResponse {
            response,
            auto_ticket,
        }
    }

    /// Unrecognized kinds go to every capability agent; replies are merged
    /// line by line, prefixed with the agent name
    async fn fan_out(&self, request: &AgentRequest) -> String {
        let roster: [&dyn Agent; 3] = [
            self.vision.as_ref(),
            self.text.as_ref(),
            self.ticket.as_ref(),
        ];

        let mut lines = Vec::with_capacity(roster.len());
        for agent in roster {
            let reply = agent.process(request).await;
            lines.push(format!("{}: {}", agent.name(), reply.text()));
        }
        lines.join("\n")
    }

    async fn auto_ticket(&self, request: &AgentRequest) -> Option<AutoTicket> {
        let detected = self.detector.process(&request.prompt)?;

        let outcome = self.ticket.execute(TicketAction::Create {
            issue: detected.issue.clone(),
            importance: detected.importance,
            origin: request.origin.clone(),
            auto_generated: true,
        });

        let auto = match outcome {
            TicketOutcome::Created { ticket, message } => {
                info!(
                    "Auto-created ticket {} ({})",
                    ticket.ticket_id, ticket.importance
                );
                AutoTicket {
                    created: true,
                    message,
                    issue: detected.issue,
                    importance: detected.importance,
                }
            }
            other => {
                // Detection succeeded but persistence did not; report, don't fail
                warn!("Auto-ticket creation failed: {}", other.render());
                AutoTicket {
                    created: false,
                    message: other.render(),
                    issue: detected.issue,
                    importance: detected.importance,
                }
            }
        };
        Some(auto)
    }

    /// Introspection roster: capability agents plus the detector and the
    /// coordinator itself
    pub fn agents_info(&self) -> Vec<AgentInfo> {
        vec![
            AgentInfo {
                name: self.vision.name().to_string(),
                memory_depth: self.vision.memory_depth(),
            },
            AgentInfo {
                name: self.text.name().to_string(),
                memory_depth: self.text.memory_depth(),
            },
            AgentInfo {
                name: self.ticket.name().to_string(),
                memory_depth: self.ticket.memory_depth(),
            },
            AgentInfo {
                name: DETECTOR_AGENT_NAME.to_string(),
                memory_depth: self.detector.memory_depth(),
            },
            AgentInfo {
                name: COORDINATOR_AGENT_NAME.to_string(),
                memory_depth: self.memory.depth(),
            },
        ]
    }
}
