//! Error types for opsdesk.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpsdeskError {
    /// Inference backend call failed or returned an unexpected shape.
    /// Converted to an error-string reply at the agent boundary, never
    /// propagated past it.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Ticket not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OpsdeskError {
    pub fn code(&self) -> &'static str {
        match self {
            OpsdeskError::Upstream(_) => "upstream",
            OpsdeskError::NotFound(_) => "not_found",
            OpsdeskError::Validation(_) => "validation",
            OpsdeskError::Storage(_) => "storage",
            OpsdeskError::Config(_) => "config",
            OpsdeskError::Io(_) => "io",
            OpsdeskError::Json(_) => "json",
        }
    }
}
