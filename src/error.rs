//! Error types for Fitts Throughput

use thiserror::Error;

/// Errors that can occur while configuring, replaying or reporting an experiment
#[derive(Debug, Error)]
pub enum FittsError {
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid pointer event: {0}")]
    InvalidEvent(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
