//! Shared HTTP plumbing for the REST-based providers.

use std::time::Duration;

use agent_core::error::{AgentError, Result};

pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))
}

/// Map a transport failure to the provider error taxonomy.
pub(crate) fn transport_error(err: &reqwest::Error) -> AgentError {
    if err.is_timeout() || err.is_connect() {
        AgentError::ProviderUnavailable(err.to_string())
    } else if err.is_decode() {
        AgentError::Parse(err.to_string())
    } else {
        AgentError::Provider(err.to_string())
    }
}

/// Pass successful responses through; turn anything else into an error that
/// carries the response body.
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AgentError::from_status(status.as_u16(), body))
}
