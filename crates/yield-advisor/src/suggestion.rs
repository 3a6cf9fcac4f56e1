//! Suggestion Facts
//!
//! The structured outcome of one decision. Each kind carries only the fields
//! that make sense for it; rendering to prose happens elsewhere.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::Asset;

/// Categorized recommendation for one asset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "suggestion_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionFact {
    /// A safe pool beats the user's best unlocked vault by more than the threshold
    MoveToBetterYield {
        asset: Asset,
        #[serde(with = "rust_decimal::serde::float")]
        current_apy: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        apy: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        apy_gain: Decimal,
        protocol_name: String,
        recommended_pool_id: String,
        reasoning: String,
    },

    /// The user's unlocked vault is competitive; `protocol_name` is its label
    HoldCurrent {
        asset: Asset,
        #[serde(with = "rust_decimal::serde::float")]
        current_apy: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        apy: Decimal,
        protocol_name: String,
        reasoning: String,
    },

    /// No unlocked position for the asset yet
    DepositToBest {
        asset: Asset,
        #[serde(with = "rust_decimal::serde::float")]
        apy: Decimal,
        protocol_name: String,
        recommended_pool_id: String,
        reasoning: String,
    },

    NoSuggestion {
        asset: Asset,
        reasoning: String,
    },

    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        asset: Option<Asset>,
        reasoning: String,
    },
}

impl SuggestionFact {
    /// Wire name of this kind
    pub fn kind(&self) -> &'static str {
        match self {
            SuggestionFact::MoveToBetterYield { .. } => "MOVE_TO_BETTER_YIELD",
            SuggestionFact::HoldCurrent { .. } => "HOLD_CURRENT",
            SuggestionFact::DepositToBest { .. } => "DEPOSIT_TO_BEST",
            SuggestionFact::NoSuggestion { .. } => "NO_SUGGESTION",
            SuggestionFact::Error { .. } => "ERROR",
        }
    }

    pub fn asset(&self) -> Option<Asset> {
        match self {
            SuggestionFact::MoveToBetterYield { asset, .. }
            | SuggestionFact::HoldCurrent { asset, .. }
            | SuggestionFact::DepositToBest { asset, .. }
            | SuggestionFact::NoSuggestion { asset, .. } => Some(*asset),
            SuggestionFact::Error { asset, .. } => *asset,
        }
    }

    pub fn reasoning(&self) -> &str {
        match self {
            SuggestionFact::MoveToBetterYield { reasoning, .. }
            | SuggestionFact::HoldCurrent { reasoning, .. }
            | SuggestionFact::DepositToBest { reasoning, .. }
            | SuggestionFact::NoSuggestion { reasoning, .. }
            | SuggestionFact::Error { reasoning, .. } => reasoning,
        }
    }

    /// Fact for an analysis that could not run
    pub fn error(asset: Option<Asset>, reasoning: impl Into<String>) -> Self {
        SuggestionFact::Error {
            asset,
            reasoning: reasoning.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_move_serializes_with_tag_and_numbers() {
        let fact = SuggestionFact::MoveToBetterYield {
            asset: Asset::Usdc,
            current_apy: dec!(5.0),
            apy: dec!(6.2),
            apy_gain: dec!(1.2),
            protocol_name: "Solend (Solana)".into(),
            recommended_pool_id: "solend_usdc_sol".into(),
            reasoning: "Found a stable option with 1.2% higher APY.".into(),
        };

        let json = serde_json::to_value(&fact).unwrap();
        assert_eq!(json["suggestion_type"], "MOVE_TO_BETTER_YIELD");
        assert_eq!(json["apy_gain"], 1.2);
        assert_eq!(json["asset"], "USDC");
        assert_eq!(fact.kind(), "MOVE_TO_BETTER_YIELD");
    }

    #[test]
    fn test_no_suggestion_has_no_pool_fields() {
        let fact = SuggestionFact::NoSuggestion {
            asset: Asset::Sol,
            reasoning: "nothing safe".into(),
        };
        let json = serde_json::to_value(&fact).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        assert!(json.get("apy").is_none());
        assert!(json.get("recommended_pool_id").is_none());
    }

    #[test]
    fn test_error_fact_without_asset() {
        let fact = SuggestionFact::error(None, "backend down");
        let json = serde_json::to_value(&fact).unwrap();
        assert_eq!(json["suggestion_type"], "ERROR");
        assert!(json.get("asset").is_none());
        assert_eq!(fact.asset(), None);
        assert_eq!(fact.reasoning(), "backend down");
    }
}
