//! Image description agent.

use crate::agent::{Agent, AgentReply, AgentRequest};
use crate::llm::CompletionBackend;
use crate::memory::MemoryLog;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub const VISION_AGENT_NAME: &str = "Vision Agent";

/// Prompt used when a vision request does not supply one
pub const DEFAULT_VISION_PROMPT: &str = "Describe this image";

/// Agent over the inference backend's image+text mode
pub struct VisionAgent {
    backend: Arc<dyn CompletionBackend>,
    memory: MemoryLog,
}

impl VisionAgent {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            memory: MemoryLog::new(),
        }
    }
}

#[async_trait]
impl Agent for VisionAgent {
    fn name(&self) -> &str {
        VISION_AGENT_NAME
    }

    async fn process(&self, request: &AgentRequest) -> AgentReply {
        let image = match &request.image {
            Some(bytes) => bytes.as_slice(),
            None => {
                return AgentReply::Failure(
                    "Error in vision processing: no image supplied".to_string(),
                )
            }
        };

        let prompt = if request.prompt.is_empty() {
            DEFAULT_VISION_PROMPT
        } else {
            &request.prompt
        };

        match self.backend.complete(prompt, Some(image)).await {
            Ok(result) => {
                self.memory.push(json!({
                    "type": "vision_analysis",
                    "result": result,
                }));
                AgentReply::Success(result)
            }
            Err(e) => AgentReply::Failure(format!("Error in vision processing: {}", e)),
        }
    }

    fn memory_depth(&self) -> usize {
        self.memory.depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FakeCompletionBackend;

    #[tokio::test]
    async fn test_describes_image() {
        let backend = Arc::new(FakeCompletionBackend::new().with_reply("a blue screen of death"));
        let agent = VisionAgent::new(backend);

        let reply = agent
            .process(&AgentRequest::vision("what error is shown?", vec![1, 2, 3], "unknown"))
            .await;
        assert_eq!(reply, AgentReply::Success("a blue screen of death".to_string()));
        assert_eq!(agent.memory_depth(), 1);
    }

    #[tokio::test]
    async fn test_empty_prompt_uses_default() {
        let backend = Arc::new(FakeCompletionBackend::new().with_reply("ok"));
        let agent = VisionAgent::new(backend.clone());

        agent
            .process(&AgentRequest::vision("", vec![0u8], "unknown"))
            .await;
        assert_eq!(backend.seen_prompts(), vec![DEFAULT_VISION_PROMPT]);
    }

    #[tokio::test]
    async fn test_missing_image_is_failure() {
        let backend = Arc::new(FakeCompletionBackend::new());
        let agent = VisionAgent::new(backend);

        let reply = agent.process(&AgentRequest::text("no image here", "unknown")).await;
        assert_eq!(
            reply,
            AgentReply::Failure("Error in vision processing: no image supplied".to_string())
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_is_data() {
        let backend = Arc::new(FakeCompletionBackend::failing("502 bad gateway"));
        let agent = VisionAgent::new(backend);

        let reply = agent
            .process(&AgentRequest::vision("describe", vec![0u8], "unknown"))
            .await;
        assert!(reply.text().starts_with("Error in vision processing: "));
    }
}
