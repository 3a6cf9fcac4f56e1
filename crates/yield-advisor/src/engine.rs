//! Yield Suggestion Decision Engine
//!
//! Turns a user's vault positions plus the pool catalog into exactly one
//! categorized recommendation for a target asset.
//!
//! ```text
//! pools ──► asset filter ──► risk ceiling ──► best safe pool
//!                                                  │
//! vaults ──► asset filter ──► unlocked? ──► current APY
//!                                                  ▼
//!               MOVE_TO_BETTER_YIELD | DEPOSIT_TO_BEST | HOLD_CURRENT
//! ```
//!
//! The engine is pure: no I/O, no clock, same inputs give the same fact.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::model::{Asset, VaultPosition, YieldPool};
use crate::suggestion::SuggestionFact;

/// Minimum APY advantage (percentage points) before a move is suggested.
/// The comparison is strict: a gain of exactly this much means hold.
pub const IMPROVEMENT_THRESHOLD: Decimal = dec!(0.5);

/// Default risk ceiling when none is configured
pub const DEFAULT_MAX_RISK_SCORE: u8 = 3;

/// Decide what the user should do with `target` holdings.
pub fn decide(
    target: Asset,
    vaults: &[VaultPosition],
    pools: &[YieldPool],
    max_risk_score: u8,
) -> SuggestionFact {
    // Ties keep the earlier pool
    let best_pool = pools
        .iter()
        .filter(|p| p.asset == target && p.risk_score <= max_risk_score)
        .reduce(|best, p| if p.current_apy > best.current_apy { p } else { best });

    let Some(best_pool) = best_pool else {
        tracing::debug!(asset = %target, max_risk_score, "No safe pool for asset");
        return SuggestionFact::NoSuggestion {
            asset: target,
            reasoning: format!(
                "Could not find suitable yield opportunities under risk score {max_risk_score}."
            ),
        };
    };

    let best_unlocked = vaults
        .iter()
        .filter(|v| target.matches(&v.token) && !v.locked)
        .filter_map(|v| match v.apy_percent() {
            Some(apy) => Some((v, apy)),
            None => {
                tracing::warn!(vault_id = %v.id, yield_rate = %v.yield_rate, "Skipping vault with out-of-range yield rate");
                None
            }
        })
        .reduce(|best, cur| if cur.1 > best.1 { cur } else { best });

    let Some((current, current_apy)) = best_unlocked else {
        return SuggestionFact::DepositToBest {
            asset: target,
            apy: best_pool.current_apy,
            protocol_name: best_pool.protocol_name.clone(),
            recommended_pool_id: best_pool.pool_id.clone(),
            reasoning: format!(
                "Found a good starting yield opportunity at {:.1}% APY.",
                best_pool.current_apy
            ),
        };
    };

    let apy_gain = best_pool.current_apy.checked_sub(current_apy);
    if let Some(apy_gain) = apy_gain.filter(|gain| *gain > IMPROVEMENT_THRESHOLD) {
        return SuggestionFact::MoveToBetterYield {
            asset: target,
            current_apy,
            apy: best_pool.current_apy,
            apy_gain,
            protocol_name: best_pool.protocol_name.clone(),
            recommended_pool_id: best_pool.pool_id.clone(),
            reasoning: format!("Found a stable option with {apy_gain:.1}% higher APY."),
        };
    }

    SuggestionFact::HoldCurrent {
        asset: target,
        current_apy,
        apy: current_apy,
        protocol_name: current.label().to_string(),
        reasoning: "Your current unlocked vault offers a competitive yield right now.".into(),
    }
}
