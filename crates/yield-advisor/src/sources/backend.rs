//! Platform backend client for vault positions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{SourceError, VaultSource};
use crate::error::{AdvisorError, Result};
use crate::model::VaultPosition;

/// `GET {base}/vault/user/{user_id}` with the caller's bearer token
pub struct BackendVaultClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendVaultClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdvisorError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn vaults_url(&self, user_id: &str) -> String {
        format!("{}/vault/user/{}", self.base_url, user_id)
    }
}

/// Non-success statuses: 404 means the user simply has no vaults.
fn status_error(status: StatusCode) -> Option<SourceError> {
    match status {
        s if s.is_success() || s == StatusCode::NOT_FOUND => None,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(SourceError::Unauthorized(
            "backend rejected the bearer token".into(),
        )),
        s => Some(SourceError::Server { status: s.as_u16() }),
    }
}

#[async_trait]
impl VaultSource for BackendVaultClient {
    async fn fetch_vaults(
        &self,
        user_id: &str,
        bearer: &str,
    ) -> std::result::Result<Vec<VaultPosition>, SourceError> {
        let url = self.vaults_url(user_id);
        tracing::info!(user_id = %user_id, "Fetching vaults from backend");

        let response = self
            .client
            .get(&url)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user_id, "Network error fetching vaults: {}", e);
                SourceError::from_reqwest(&e)
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::info!(user_id = %user_id, "No vaults found (404)");
            return Ok(Vec::new());
        }
        if let Some(err) = status_error(status) {
            tracing::error!(user_id = %user_id, %status, "Backend error fetching vaults");
            return Err(err);
        }

        let vaults: Vec<VaultPosition> = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        tracing::info!(user_id = %user_id, count = vaults.len(), "Fetched vaults");
        Ok(vaults)
    }
}
