//! Application State

use std::sync::Arc;

use yield_advisor::{BalanceSource, ChatResponder, ContextAggregator, SuggestionService};

use crate::auth::TokenVerifier;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Decision engine plus renderer
    pub suggestions: Arc<SuggestionService>,

    pub context: Arc<ContextAggregator>,

    pub responder: Arc<dyn ChatResponder>,

    /// Wallet balances for the balances endpoint
    pub balances: Arc<dyn BalanceSource>,

    pub verifier: Arc<TokenVerifier>,

    /// Display name of the selected LLM, "none" without one
    pub llm_provider: String,
}
