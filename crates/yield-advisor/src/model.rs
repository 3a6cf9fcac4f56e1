//! Domain Models
//!
//! Core data types for vault positions, yield pools and wallet balances.
//! Uses `rust_decimal` for all monetary values and rates.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Assets the co-pilot knows how to reason about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Asset {
    Usdc,
    Usdt,
    Sol,
}

impl Asset {
    pub const ALL: [Asset; 3] = [Asset::Usdc, Asset::Usdt, Asset::Sol];

    pub fn symbol(self) -> &'static str {
        match self {
            Asset::Usdc => "USDC",
            Asset::Usdt => "USDT",
            Asset::Sol => "SOL",
        }
    }

    /// Whether a free-form token symbol names this asset
    pub fn matches(self, symbol: &str) -> bool {
        symbol.trim().eq_ignore_ascii_case(self.symbol())
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Asset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Asset::ALL
            .into_iter()
            .find(|asset| asset.matches(s))
            .ok_or_else(|| format!("unsupported asset '{s}'"))
    }
}

impl TryFrom<String> for Asset {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A user's deposit in a platform vault, as reported by the backend
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultPosition {
    pub id: String,

    /// Display name, when the backend has one
    #[serde(default)]
    pub name: Option<String>,

    /// Token symbol held by the vault
    pub token: String,

    pub total_deposits: Decimal,

    /// Fractional yield rate (0.062 = 6.2%)
    pub yield_rate: Decimal,

    pub locked: bool,

    #[serde(default)]
    pub lock_period_days: Option<u32>,
}

impl VaultPosition {
    pub fn new(id: impl Into<String>, token: impl Into<String>, yield_rate: Decimal) -> Self {
        Self {
            id: id.into(),
            name: None,
            token: token.into(),
            total_deposits: Decimal::ZERO,
            yield_rate,
            locked: false,
            lock_period_days: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_deposits(mut self, amount: Decimal) -> Self {
        self.total_deposits = amount;
        self
    }

    pub fn locked_for(mut self, days: u32) -> Self {
        self.locked = true;
        self.lock_period_days = Some(days);
        self
    }

    /// Human label: the name when present, otherwise the id
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(self.id.as_str())
    }

    /// Yield rate expressed in percent; `None` when the rate is too large
    /// to scale
    pub fn apy_percent(&self) -> Option<Decimal> {
        self.yield_rate.checked_mul(dec!(100))
    }
}

/// A yield opportunity from the pool catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct YieldPool {
    pub pool_id: String,
    pub protocol_name: String,
    pub asset: Asset,

    /// APY in percent (5.8 = 5.8%)
    #[serde(with = "rust_decimal::serde::float")]
    pub current_apy: Decimal,

    /// Lower is safer
    pub risk_score: u8,
}

impl YieldPool {
    pub fn new(
        pool_id: impl Into<String>,
        protocol_name: impl Into<String>,
        asset: Asset,
        current_apy: Decimal,
        risk_score: u8,
    ) -> Self {
        Self {
            pool_id: pool_id.into(),
            protocol_name: protocol_name.into(),
            asset,
            current_apy,
            risk_score,
        }
    }
}

/// One token held in a wallet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub token_symbol: String,

    /// Human-readable amount, rounded to 4 dp
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_ui: Decimal,

    /// Smallest-unit amount as reported on chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_raw: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_mint: Option<String>,
}

/// Balances for one wallet address
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletBalances {
    pub wallet_address: String,
    pub balances: Vec<TokenBalance>,
}

impl WalletBalances {
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_parse_case_insensitive() {
        assert_eq!("usdc".parse::<Asset>().unwrap(), Asset::Usdc);
        assert_eq!(" Sol ".parse::<Asset>().unwrap(), Asset::Sol);
        assert!("DOGE".parse::<Asset>().is_err());
    }

    #[test]
    fn test_asset_serde() {
        assert_eq!(serde_json::to_value(Asset::Usdt).unwrap(), "USDT");
        let asset: Asset = serde_json::from_value(serde_json::json!("sol")).unwrap();
        assert_eq!(asset, Asset::Sol);
    }

    #[test]
    fn test_vault_from_backend_json() {
        let vault: VaultPosition = serde_json::from_value(serde_json::json!({
            "id": "v-1",
            "token": "USDC",
            "totalDeposits": 150.5,
            "yieldRate": 0.062,
            "locked": true,
            "lockPeriodDays": 30
        }))
        .unwrap();

        assert_eq!(vault.label(), "v-1");
        assert_eq!(vault.apy_percent(), Some(dec!(6.2)));
        assert_eq!(vault.total_deposits, dec!(150.5));
        assert_eq!(vault.lock_period_days, Some(30));
    }

    #[test]
    fn test_oversized_yield_rate_has_no_percent() {
        let vault: VaultPosition = serde_json::from_value(serde_json::json!({
            "id": "v-1",
            "token": "USDC",
            "totalDeposits": 1,
            "yieldRate": 1e27,
            "locked": false
        }))
        .unwrap();

        assert_eq!(vault.apy_percent(), None);
    }

    #[test]
    fn test_label_prefers_name() {
        let vault = VaultPosition::new("v-2", "USDT", dec!(0.05)).with_name("Main Yield");
        assert_eq!(vault.label(), "Main Yield");

        let blank = VaultPosition::new("v-3", "USDT", dec!(0.05)).with_name("  ");
        assert_eq!(blank.label(), "v-3");
    }

    #[test]
    fn test_pool_apy_serializes_as_number() {
        let pool = YieldPool::new("p", "Proto", Asset::Usdc, dec!(5.8), 2);
        let json = serde_json::to_value(&pool).unwrap();
        assert_eq!(json["current_apy"], 5.8);
        assert_eq!(json["asset"], "USDC");
    }
}
