//! Capability agent contract.
//!
//! Every handler satisfies one request category behind the same seam:
//! `process(request) -> reply`, where the reply is always a displayable
//! string. Upstream failures are data, not errors — the coordinator's merge
//! logic never needs handler-specific error handling.

use async_trait::async_trait;
use serde_json::Value;

/// Normalized request handed to an agent
#[derive(Debug, Clone, Default)]
pub struct AgentRequest {
    pub prompt: String,
    /// Raw image bytes for vision requests
    pub image: Option<Vec<u8>>,
    /// Requester network address, best effort
    pub origin: String,
    /// Structured parameters for the ticket agent's action dispatch
    pub params: Option<Value>,
}

impl AgentRequest {
    pub fn text(prompt: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            origin: origin.into(),
            ..Default::default()
        }
    }

    pub fn vision(prompt: impl Into<String>, image: Vec<u8>, origin: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
            origin: origin.into(),
            ..Default::default()
        }
    }
}

/// Agent result: success payload or a displayable failure message
#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    Success(String),
    Failure(String),
}

impl AgentReply {
    pub fn text(&self) -> &str {
        match self {
            Self::Success(s) | Self::Failure(s) => s,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl std::fmt::Display for AgentReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// A capability handler
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    async fn process(&self, request: &AgentRequest) -> AgentReply;

    /// Depth of the agent's invocation log, for introspection
    fn memory_depth(&self) -> usize;
}
