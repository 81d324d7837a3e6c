//! Configuration management for opsdeskd.
//!
//! Loads settings from /etc/opsdesk/config.toml (overridable via
//! OPSDESK_CONFIG). A missing file falls back to defaults with a log line;
//! a malformed file is an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Default config file path
pub const CONFIG_PATH: &str = "/etc/opsdesk/config.toml";

/// Environment variable overriding the config path
pub const CONFIG_ENV: &str = "OPSDESK_CONFIG";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:7810".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Ticket storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per ticket
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "/var/lib/opsdesk/tickets".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Inference backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_text_model")]
    pub text_model: String,

    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Deadline on each inference call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_api_key_env() -> String {
    "OPSDESK_API_KEY".to_string()
}

fn default_text_model() -> String {
    "meta-llama/llama-3.1-8b-instruct:free".to_string()
}

fn default_vision_model() -> String {
    "meta-llama/llama-3.1-8b-vision:free".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key_env: default_api_key_env(),
            text_model: default_text_model(),
            vision_model: default_vision_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

impl Config {
    /// Load from OPSDESK_CONFIG or the default path; defaults when the file
    /// is missing, error when it is malformed
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| CONFIG_PATH.to_string());
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!("Config not found at {}, using defaults", path);
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config at {}", path))?;
        info!("Loaded config from {}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.listen_addr, "127.0.0.1:7810");
        assert_eq!(config.storage.data_dir, "/var/lib/opsdesk/tickets");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.llm.request_timeout_secs, 120);
    }

    #[test]
    fn test_parse_toml_overrides() {
        let toml_str = r#"
[server]
listen_addr = "0.0.0.0:9000"

[llm]
text_model = "custom/model"
max_tokens = 512
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.llm.text_model, "custom/model");
        assert_eq!(config.llm.max_tokens, 512);
        // Defaults for missing fields
        assert_eq!(config.llm.vision_model, "meta-llama/llama-3.1-8b-vision:free");
        assert_eq!(config.storage.data_dir, "/var/lib/opsdesk/tickets");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load_from_path("/nonexistent/opsdesk-test.toml").unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:7810");
    }

    #[test]
    fn test_malformed_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is { not toml").unwrap();

        assert!(Config::load_from_path(path.to_str().unwrap()).is_err());
    }
}
