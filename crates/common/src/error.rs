//! Error types for Curie.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CurieError {
    #[error("Agent error: {0}")]
    Agent(String),

    #[error("LLM error: {0}")]
    Llm(String),

    /// A provider answered with a non-success HTTP status.
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("MCP error: {0}")]
    Mcp(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CurieError {
    /// Whether a retry of the same request could reasonably succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CurieError::Api { status, .. } => *status == 429 || (500..600).contains(status),
            CurieError::Llm(_) | CurieError::Io(_) => true,
            _ => false,
        }
    }

    /// Server-requested delay before the next attempt, in seconds.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            CurieError::Api {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CurieError>;
