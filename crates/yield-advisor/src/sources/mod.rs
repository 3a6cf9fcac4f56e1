//! Data Sources
//!
//! Boundaries to the systems that know about a user's money: the platform
//! backend (vault positions) and the chain (wallet balances).

mod backend;
mod solana;

pub use backend::BackendVaultClient;
pub use solana::{SolanaBalanceClient, TokenMint};

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{VaultPosition, WalletBalances};

/// Failure talking to a data source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server returned HTTP {status}")]
    Server { status: u16 },

    #[error("Malformed wallet address: {0}")]
    MalformedAddress(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The fetch itself failed unexpectedly, e.g. it panicked
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SourceError {
    /// Short user-facing category, used inside context text
    pub fn category(&self) -> &'static str {
        match self {
            SourceError::Unauthorized(_) => "authorization error",
            SourceError::Transport(_) => "connection error",
            SourceError::Timeout => "timeout",
            SourceError::Server { .. } => "server error",
            SourceError::MalformedAddress(_) => "invalid wallet address",
            SourceError::Decode(_) => "unexpected response",
            SourceError::Internal(_) => "unexpected error",
        }
    }

    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::Server { status: status.as_u16() }
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

/// Vault positions held on the platform backend
#[async_trait]
pub trait VaultSource: Send + Sync {
    /// All vaults for a user. A user the backend does not know has no vaults.
    async fn fetch_vaults(&self, user_id: &str, bearer: &str)
    -> Result<Vec<VaultPosition>, SourceError>;
}

/// Token balances of a wallet
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// `Ok(None)` when nothing could be read for the wallet. Tokens that fail
    /// individually are skipped.
    async fn fetch_balances(&self, wallet: &str) -> Result<Option<WalletBalances>, SourceError>;
}
