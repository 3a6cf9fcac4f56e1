//! Conversational Context Aggregator
//!
//! Fans out to the vault and balance sources at the same time and turns
//! whatever comes back into one block of text for the chat model. A failing
//! or slow source degrades its own section only.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;

use crate::model::{VaultPosition, WalletBalances};
use crate::sources::{BalanceSource, SourceError, VaultSource};

/// Default per-fetch deadline
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub const ASSEMBLY_FAILED: &str = "An unexpected error occurred while retrieving account details.";

pub struct ContextAggregator {
    vaults: Arc<dyn VaultSource>,
    balances: Arc<dyn BalanceSource>,
    fetch_timeout: Duration,
}

impl ContextAggregator {
    pub fn new(vaults: Arc<dyn VaultSource>, balances: Arc<dyn BalanceSource>) -> Self {
        Self {
            vaults,
            balances,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Build the context block for one chat turn. Never fails; the outer
    /// guard only covers summarizing, fetch failures are per source.
    pub async fn build_context(&self, user_id: &str, bearer: &str, wallet: Option<&str>) -> String {
        match AssertUnwindSafe(self.assemble(user_id, bearer, wallet))
            .catch_unwind()
            .await
        {
            Ok(context) => context,
            Err(_) => {
                tracing::error!(user_id = %user_id, "Context assembly panicked");
                ASSEMBLY_FAILED.into()
            }
        }
    }

    async fn assemble(&self, user_id: &str, bearer: &str, wallet: Option<&str>) -> String {
        let (vaults, balances) = tokio::join!(
            self.timed(self.vaults.fetch_vaults(user_id, bearer)),
            async {
                match wallet {
                    Some(wallet) => self.timed(self.balances.fetch_balances(wallet)).await,
                    None => Ok(None),
                }
            }
        );

        if let Err(e) = &vaults {
            tracing::warn!(user_id = %user_id, "Vault fetch failed: {}", e);
        }
        if let Err(e) = &balances {
            tracing::warn!(user_id = %user_id, "Balance fetch failed: {}", e);
        }

        format!(
            "{}\n{}",
            summarize_vaults(&vaults),
            summarize_balances(&balances)
        )
    }

    /// One fetch with its own deadline. A timeout or a panic becomes this
    /// source's error and leaves the other fetch untouched.
    async fn timed<T>(
        &self,
        fetch: impl Future<Output = Result<T, SourceError>>,
    ) -> Result<T, SourceError> {
        match AssertUnwindSafe(tokio::time::timeout(self.fetch_timeout, fetch))
            .catch_unwind()
            .await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(SourceError::Timeout),
            Err(_) => Err(SourceError::Internal("fetch panicked".into())),
        }
    }
}

/// Vault section of the context
pub fn summarize_vaults(outcome: &Result<Vec<VaultPosition>, SourceError>) -> String {
    match outcome {
        Err(e) => format!("Error retrieving vault details ({}).", e.category()),
        Ok(vaults) if vaults.is_empty() => "User has no vaults yet.".into(),
        Ok(vaults) => {
            let mut out = String::from("User's Vaults:");
            for vault in vaults {
                let status = match (vault.locked, vault.lock_period_days) {
                    (true, Some(days)) => format!("Locked ({days} days)"),
                    (true, None) => "Locked".into(),
                    (false, _) => "Unlocked".into(),
                };
                let apy = vault
                    .apy_percent()
                    .map_or_else(|| "unknown".to_string(), |apy| format!("{apy:.2}%"));
                out.push_str(&format!(
                    "\n- Vault '{}': {:.2} {}, APY: {}, Status: {}",
                    vault.label(),
                    vault.total_deposits,
                    vault.token,
                    apy,
                    status
                ));
            }
            out
        }
    }
}

/// Wallet section of the context
pub fn summarize_balances(outcome: &Result<Option<WalletBalances>, SourceError>) -> String {
    match outcome {
        Err(e) => format!("Error retrieving wallet balances ({}).", e.category()),
        Ok(Some(wallet)) if !wallet.is_empty() => {
            let mut out = String::from("User's Wallet Balances:");
            for balance in &wallet.balances {
                out.push_str(&format!(
                    "\n- Wallet: {:.4} {}",
                    balance.amount_ui, balance.token_symbol
                ));
            }
            out
        }
        Ok(_) => "Could not find wallet balances or wallet is empty.".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TokenBalance;
    use crate::testing::{StubBalances, StubVaults};
    use rust_decimal_macros::dec;

    const WALLET: &str = "Gh9ZwEmdLJ8DscKNTkTqPbNwLNNBjuSzaG9Vp2KGtKJr";

    fn some_vaults() -> Result<Vec<VaultPosition>, SourceError> {
        Ok(vec![
            VaultPosition::new("v-1", "USDC", dec!(0.062))
                .with_name("Main Yield")
                .with_deposits(dec!(150.5))
                .locked_for(30),
            VaultPosition::new("v-2", "SOL", dec!(0.07)).with_deposits(dec!(2)),
        ])
    }

    fn some_balances() -> Result<Option<WalletBalances>, SourceError> {
        Ok(Some(WalletBalances {
            wallet_address: WALLET.into(),
            balances: vec![TokenBalance {
                token_symbol: "SOL".into(),
                amount_ui: dec!(1.5),
                amount_raw: Some("1500000000".into()),
                token_mint: None,
            }],
        }))
    }

    fn aggregator(
        vaults: fn() -> Result<Vec<VaultPosition>, SourceError>,
        vault_delay: Duration,
        balances: fn() -> Result<Option<WalletBalances>, SourceError>,
    ) -> ContextAggregator {
        ContextAggregator::new(
            Arc::new(StubVaults { outcome: vaults, delay: vault_delay }),
            Arc::new(StubBalances { outcome: balances, delay: Duration::ZERO }),
        )
    }

    #[tokio::test]
    async fn test_full_context() {
        let context = aggregator(some_vaults, Duration::ZERO, some_balances)
            .build_context("u-1", "token", Some(WALLET))
            .await;

        assert_eq!(
            context,
            "User's Vaults:\n\
             - Vault 'Main Yield': 150.50 USDC, APY: 6.20%, Status: Locked (30 days)\n\
             - Vault 'v-2': 2.00 SOL, APY: 7.00%, Status: Unlocked\n\
             User's Wallet Balances:\n\
             - Wallet: 1.5000 SOL"
        );
    }

    #[tokio::test]
    async fn test_vault_failure_keeps_balances() {
        let context = aggregator(
            || Err(SourceError::Transport("refused".into())),
            Duration::ZERO,
            some_balances,
        )
        .build_context("u-1", "token", Some(WALLET))
        .await;

        assert!(context.starts_with("Error retrieving vault details (connection error)."));
        assert!(context.contains("- Wallet: 1.5000 SOL"));
    }

    #[tokio::test]
    async fn test_slow_source_times_out_alone() {
        let context = aggregator(some_vaults, Duration::from_millis(500), some_balances)
            .with_timeout(Duration::from_millis(50))
            .build_context("u-1", "token", Some(WALLET))
            .await;

        assert!(context.starts_with("Error retrieving vault details (timeout)."));
        assert!(context.contains("User's Wallet Balances:"));
    }

    #[tokio::test]
    async fn test_empty_sources() {
        let context = aggregator(|| Ok(Vec::new()), Duration::ZERO, || Ok(None))
            .build_context("u-1", "token", Some(WALLET))
            .await;

        assert_eq!(
            context,
            "User has no vaults yet.\nCould not find wallet balances or wallet is empty."
        );
    }

    #[tokio::test]
    async fn test_missing_wallet_skips_balance_fetch() {
        let context = aggregator(some_vaults, Duration::ZERO, || {
            Err(SourceError::Server { status: 500 })
        })
        .build_context("u-1", "token", None)
        .await;

        assert!(context.ends_with("Could not find wallet balances or wallet is empty."));
    }

    #[tokio::test]
    async fn test_balance_failure_keeps_vaults() {
        let context = aggregator(some_vaults, Duration::ZERO, || {
            Err(SourceError::Server { status: 502 })
        })
        .build_context("u-1", "token", Some(WALLET))
        .await;

        assert!(context.starts_with("User's Vaults:\n- Vault 'Main Yield'"));
        assert!(context.ends_with("Error retrieving wallet balances (server error)."));
    }

    #[tokio::test]
    async fn test_panicking_source_keeps_the_other() {
        let context = aggregator(|| panic!("source blew up"), Duration::ZERO, some_balances)
            .build_context("u-1", "token", Some(WALLET))
            .await;

        assert_ne!(context, ASSEMBLY_FAILED);
        assert!(context.starts_with("Error retrieving vault details (unexpected error)."));
        assert!(context.contains("- Wallet: 1.5000 SOL"));
    }

    #[test]
    fn test_balance_error_category() {
        let text = summarize_balances(&Err(SourceError::MalformedAddress("bad".into())));
        assert_eq!(text, "Error retrieving wallet balances (invalid wallet address).");
    }
}
