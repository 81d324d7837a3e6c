//! Text completion agent.

use crate::agent::{Agent, AgentReply, AgentRequest};
use crate::llm::CompletionBackend;
use crate::memory::MemoryLog;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub const TEXT_AGENT_NAME: &str = "Text Agent";

/// Thin agent over the inference backend for plain text prompts
pub struct TextAgent {
    backend: Arc<dyn CompletionBackend>,
    memory: MemoryLog,
}

impl TextAgent {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            memory: MemoryLog::new(),
        }
    }
}

#[async_trait]
impl Agent for TextAgent {
    fn name(&self) -> &str {
        TEXT_AGENT_NAME
    }

    async fn process(&self, request: &AgentRequest) -> AgentReply {
        match self.backend.complete(&request.prompt, None).await {
            Ok(result) => {
                self.memory.push(json!({
                    "type": "text_analysis",
                    "result": result,
                }));
                AgentReply::Success(result)
            }
            Err(e) => AgentReply::Failure(format!("Error in text processing: {}", e)),
        }
    }

    fn memory_depth(&self) -> usize {
        self.memory.depth()
    }
}
