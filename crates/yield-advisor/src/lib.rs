//! # yield-advisor
//!
//! Yield suggestions and conversational context for a user's stablecoin and
//! SOL holdings.
//!
//! ## Pieces
//!
//! - **Decision engine** - pure rules that turn vault positions plus a pool
//!   catalog into one categorized `SuggestionFact`
//! - **Rendering** - generative (LLM) or template prose for a fact
//! - **Context aggregator** - concurrent, failure-tolerant fetch of vaults and
//!   wallet balances, summarized as text
//! - **Responder** - chat replies with at most one validated `ActionIntent`
//!
//! ## Example: choosing a USDC suggestion
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Catalog (risk ≤ 3)            User's unlocked USDC vault      │
//! ├───────────────────────────────────────────────────────────────┤
//! │  Aave V3      5.8%  r2                                         │
//! │  Compound     5.5%  r2         Main Yield   5.0%               │
//! │  Solend       6.2%  r3  ◄ best                                 │
//! │  NewDeFi      7.5%  r4  (too risky)                            │
//! └───────────────────────────────────────────────────────────────┘
//!   6.2 > 5.0 + 0.5  →  MOVE_TO_BETTER_YIELD (+1.2% APY)
//! ```

pub mod advisor;
pub mod catalog;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod intent;
pub mod model;
pub mod prompts;
pub mod render;
pub mod responder;
pub mod sources;
pub mod suggestion;

#[cfg(test)]
mod testing;

pub use advisor::{Suggestion, SuggestionService};
pub use catalog::PoolCatalog;
pub use config::AdvisorConfig;
pub use context::ContextAggregator;
pub use engine::{IMPROVEMENT_THRESHOLD, decide};
pub use error::{AdvisorError, Result};
pub use intent::ActionIntent;
pub use model::{Asset, TokenBalance, VaultPosition, WalletBalances, YieldPool};
pub use render::{GenerativeRenderer, SuggestionRenderer, TemplateRenderer, renderer_for};
pub use responder::{ChatReply, ChatResponder, GenerativeResponder, UnavailableResponder, responder_for};
pub use sources::{BackendVaultClient, BalanceSource, SolanaBalanceClient, SourceError, VaultSource};
pub use suggestion::SuggestionFact;
