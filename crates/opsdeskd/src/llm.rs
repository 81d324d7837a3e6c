//! Inference backend for text and vision completions.
//!
//! Production code talks to an OpenRouter-compatible chat-completions API.
//! Test code uses `FakeCompletionBackend` with scripted replies, so agent
//! and coordinator behavior is deterministic without network access.

use crate::config::LlmConfig;
use async_trait::async_trait;
use base64::Engine;
use opsdesk_shared::error::OpsdeskError;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// Text/image inference capability
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Complete a prompt, optionally grounded on raw image bytes
    async fn complete(&self, prompt: &str, image: Option<&[u8]>) -> Result<String, OpsdeskError>;
}

/// Client for an OpenRouter-style chat-completions endpoint
pub struct OpenRouterClient {
    http_client: reqwest::Client,
    api_url: String,
    api_key: String,
    text_model: String,
    vision_model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenRouterClient {
    pub fn from_config(config: &LlmConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env).unwrap_or_else(|_| {
            warn!(
                "{} not set, inference calls will be rejected upstream",
                config.api_key_env
            );
            String::new()
        });

        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
                .unwrap_or_default(),
            api_url: config.api_url.clone(),
            api_key,
            text_model: config.text_model.clone(),
            vision_model: config.vision_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Chat-completions payload: a single user message, either plain text or
    /// a two-part content array with a base64 data-URL image
    fn build_payload(&self, prompt: &str, image: Option<&[u8]>) -> Value {
        match image {
            Some(bytes) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                json!({
                    "model": self.vision_model,
                    "messages": [{
                        "role": "user",
                        "content": [
                            {"type": "text", "text": prompt},
                            {"type": "image_url", "image_url": {
                                "url": format!("data:image/jpeg;base64,{}", encoded)
                            }}
                        ]
                    }],
                    "max_tokens": self.max_tokens,
                    "temperature": self.temperature
                })
            }
            None => json!({
                "model": self.text_model,
                "messages": [{"role": "user", "content": prompt}],
                "max_tokens": self.max_tokens,
                "temperature": self.temperature
            }),
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterClient {
    async fn complete(&self, prompt: &str, image: Option<&[u8]>) -> Result<String, OpsdeskError> {
        let payload = self.build_payload(prompt, image);
        debug!(
            "Inference call, model {}, prompt {} chars",
            payload["model"], prompt.len()
        );

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| OpsdeskError::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpsdeskError::Upstream(format!(
                "upstream returned {}: {}",
                status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| OpsdeskError::Upstream(format!("malformed response: {}", e)))?;

        extract_content(&body)
    }
}

/// Pull `choices[0].message.content` out of a chat-completions response
fn extract_content(body: &Value) -> Result<String, OpsdeskError> {
    body.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| OpsdeskError::Upstream("response missing message content".to_string()))
}

/// Scripted backend for deterministic tests.
///
/// Replies are popped in order; when the script runs dry it answers with a
/// fixed default. Received prompts are recorded for assertions.
pub struct FakeCompletionBackend {
    replies: Mutex<VecDeque<String>>,
    failure: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeCompletionBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            failure: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Backend whose every call fails with the given upstream message
    pub fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            failure: Some(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(self, reply: &str) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply.to_string());
        self
    }

    /// Prompts received so far, in call order
    pub fn seen_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for FakeCompletionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for FakeCompletionBackend {
    async fn complete(&self, prompt: &str, _image: Option<&[u8]>) -> Result<String, OpsdeskError> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());

        if let Some(message) = &self.failure {
            return Err(OpsdeskError::Upstream(message.clone()));
        }

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| "scripted reply".to_string());
        Ok(reply)
    }
}
