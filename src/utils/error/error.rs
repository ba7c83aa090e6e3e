//! Error handling for the agent
//!
//! This module defines all error types used throughout the agent.
//!
//! Target-health failures never surface here: evaluators turn them into a
//! [`HealthStatus`](crate::core::types::HealthStatus). What remains are
//! configuration problems caught at load time, cancellation, and the few
//! infrastructure failures that cannot be expressed as a verdict.

use thiserror::Error;

/// Result type alias for the agent
pub type Result<T> = std::result::Result<T, AgentError>;

/// Main error type for the agent
#[derive(Error, Debug)]
pub enum AgentError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The caller or the engine asked for the work to stop
    #[error("Operation cancelled")]
    Cancelled,

    /// Backend data that violates the expected shape; never recoverable
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Check data reporting errors
    #[error("Reporting error: {0}")]
    Reporting(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn parsing<S: Into<String>>(message: S) -> Self {
        Self::Parsing(message.into())
    }

    pub fn reporting<S: Into<String>>(message: S) -> Self {
        Self::Reporting(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this error represents cancellation rather than failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AgentError::Cancelled)
    }

    /// Whether the backend returned structurally unexpected data
    pub fn is_fatal(&self) -> bool {
        matches!(self, AgentError::Parsing(_))
    }
}
