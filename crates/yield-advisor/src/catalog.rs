//! Pool Catalog
//!
//! The supplied list of yield opportunities the decision engine ranks.
//! Either the built-in catalog or one loaded from a JSON file at startup.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{AdvisorError, Result};
use crate::model::{Asset, YieldPool};

/// Read-only catalog of yield pools, in ranking order
#[derive(Clone, Debug, PartialEq)]
pub struct PoolCatalog {
    pools: Vec<YieldPool>,
}

impl Default for PoolCatalog {
    fn default() -> Self {
        Self {
            pools: vec![
                YieldPool::new("aave_usdc_v3_eth", "Aave V3 (Ethereum)", Asset::Usdc, dec!(5.8), 2),
                YieldPool::new("compound_usdc_eth", "Compound (Ethereum)", Asset::Usdc, dec!(5.5), 2),
                YieldPool::new("solend_usdc_sol", "Solend (Solana)", Asset::Usdc, dec!(6.2), 3),
                YieldPool::new("new_usdc_arb", "NewDeFi (Arbitrum)", Asset::Usdc, dec!(7.5), 4),
                YieldPool::new("aave_usdt_v3_eth", "Aave V3 (Ethereum)", Asset::Usdt, dec!(6.1), 2),
                YieldPool::new("compound_usdt_eth", "Compound (Ethereum)", Asset::Usdt, dec!(5.9), 2),
                YieldPool::new("solend_usdt_sol", "Solend (Solana)", Asset::Usdt, dec!(6.5), 3),
                YieldPool::new("marinade_sol_sol", "Marinade Staking", Asset::Sol, dec!(7.0), 2),
                YieldPool::new("lido_sol_sol", "Lido Staking", Asset::Sol, dec!(6.8), 2),
            ],
        }
    }
}

impl PoolCatalog {
    /// Build a catalog after checking that ids are unique and non-empty and
    /// that no APY is negative.
    pub fn new(pools: Vec<YieldPool>) -> Result<Self> {
        let mut seen = HashSet::new();
        for pool in &pools {
            if pool.pool_id.trim().is_empty() {
                return Err(AdvisorError::Config("pool with empty pool_id".into()));
            }
            if !seen.insert(pool.pool_id.as_str()) {
                return Err(AdvisorError::Config(format!(
                    "duplicate pool_id '{}'",
                    pool.pool_id
                )));
            }
            if pool.current_apy < Decimal::ZERO {
                return Err(AdvisorError::Config(format!(
                    "pool '{}' has negative APY {}",
                    pool.pool_id, pool.current_apy
                )));
            }
        }
        Ok(Self { pools })
    }

    /// Load a JSON array of pools
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let pools: Vec<YieldPool> = serde_json::from_str(raw)
            .map_err(|e| AdvisorError::Config(format!("invalid pool catalog: {e}")))?;
        Self::new(pools)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AdvisorError::Config(format!("cannot read pool catalog {}: {e}", path.display()))
        })?;
        let catalog = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), pools = catalog.len(), "Loaded pool catalog");
        Ok(catalog)
    }

    pub fn pools(&self) -> &[YieldPool] {
        &self.pools
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_covers_every_asset() {
        let catalog = PoolCatalog::default();
        assert_eq!(catalog.len(), 9);
        for asset in Asset::ALL {
            assert!(catalog.pools().iter().any(|p| p.asset == asset));
        }
    }

    #[test]
    fn test_from_json_str() {
        let catalog = PoolCatalog::from_json_str(
            r#"[
                {"pool_id": "a", "protocol_name": "A", "asset": "USDC", "current_apy": 4.2, "risk_score": 1},
                {"pool_id": "b", "protocol_name": "B", "asset": "sol", "current_apy": 7, "risk_score": 2}
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.pools()[0].current_apy, dec!(4.2));
        assert_eq!(catalog.pools()[1].asset, Asset::Sol);
    }

    #[test]
    fn test_rejects_duplicates_and_negative_apy() {
        let dup = vec![
            YieldPool::new("x", "X", Asset::Usdc, dec!(1), 1),
            YieldPool::new("x", "Y", Asset::Usdt, dec!(2), 1),
        ];
        assert!(matches!(PoolCatalog::new(dup), Err(AdvisorError::Config(_))));

        let negative = vec![YieldPool::new("n", "N", Asset::Usdc, dec!(-0.1), 1)];
        assert!(PoolCatalog::new(negative).is_err());

        let blank = vec![YieldPool::new(" ", "N", Asset::Usdc, dec!(1), 1)];
        assert!(PoolCatalog::new(blank).is_err());
    }

    #[test]
    fn test_rejects_unknown_asset() {
        let result = PoolCatalog::from_json_str(
            r#"[{"pool_id": "d", "protocol_name": "D", "asset": "DOGE", "current_apy": 9, "risk_score": 5}]"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = PoolCatalog::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(AdvisorError::Config(_))));
    }
}
