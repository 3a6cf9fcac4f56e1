//! Error Types

use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider returned an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Tool call arguments did not match the advertised schema
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Parse error (e.g., malformed provider payload)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl AgentError {
    /// Build an error from a non-success HTTP status returned by a provider.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => AgentError::Auth(body),
            429 => AgentError::RateLimited(body),
            500..=599 => AgentError::ProviderUnavailable(format!("HTTP {status}: {body}")),
            _ => AgentError::Provider(format!("HTTP {status}: {body}")),
        }
    }
}
