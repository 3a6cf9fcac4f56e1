//! Suggestion Service
//!
//! Loads a user's vaults, runs the decision engine against the catalog and
//! renders the outcome. A vault source that rejects the caller's token is an
//! error for the caller; any other source failure becomes an `ERROR` fact so
//! the user still gets a sentence.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::catalog::PoolCatalog;
use crate::config::AdvisorConfig;
use crate::engine::decide;
use crate::error::{AdvisorError, Result};
use crate::model::Asset;
use crate::render::SuggestionRenderer;
use crate::sources::{SourceError, VaultSource};
use crate::suggestion::SuggestionFact;

/// A decided and rendered suggestion
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Suggestion {
    pub fact: SuggestionFact,
    pub text: String,
}

pub struct SuggestionService {
    catalog: Arc<PoolCatalog>,
    vaults: Arc<dyn VaultSource>,
    renderer: Arc<dyn SuggestionRenderer>,
    max_risk_score: u8,
    fetch_timeout: Duration,
}

impl SuggestionService {
    pub fn new(
        config: &AdvisorConfig,
        catalog: Arc<PoolCatalog>,
        vaults: Arc<dyn VaultSource>,
        renderer: Arc<dyn SuggestionRenderer>,
    ) -> Self {
        Self {
            catalog,
            vaults,
            renderer,
            max_risk_score: config.max_risk_score,
            fetch_timeout: config.fetch_timeout,
        }
    }

    pub fn max_risk_score(&self) -> u8 {
        self.max_risk_score
    }

    pub fn renderer_name(&self) -> String {
        self.renderer.name()
    }

    /// Decide without rendering.
    pub async fn fact_for(&self, user_id: &str, bearer: &str, asset: Asset) -> Result<SuggestionFact> {
        let fetched = tokio::time::timeout(self.fetch_timeout, self.vaults.fetch_vaults(user_id, bearer))
            .await
            .unwrap_or(Err(SourceError::Timeout));

        match fetched {
            Ok(vaults) => {
                let fact = decide(asset, &vaults, self.catalog.pools(), self.max_risk_score);
                tracing::info!(user_id = %user_id, asset = %asset, kind = fact.kind(), "Suggestion decided");
                Ok(fact)
            }
            Err(e @ SourceError::Unauthorized(_)) => {
                tracing::warn!(user_id = %user_id, "Backend rejected token");
                Err(AdvisorError::Upstream(e))
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, asset = %asset, "Could not load vaults: {}", e);
                Ok(SuggestionFact::error(
                    Some(asset),
                    format!("Could not load vault positions ({}).", e.category()),
                ))
            }
        }
    }

    /// Decide and render the suggestion for one asset.
    pub async fn suggest(&self, user_id: &str, bearer: &str, asset: Asset) -> Result<Suggestion> {
        let fact = self.fact_for(user_id, bearer, asset).await?;
        let text = self.renderer.render(&fact).await?;
        Ok(Suggestion { fact, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VaultPosition;
    use crate::render::{GenerativeRenderer, TemplateRenderer};
    use crate::testing::{StubProvider, StubVaults};
    use rust_decimal_macros::dec;

    fn service(
        outcome: fn() -> std::result::Result<Vec<VaultPosition>, SourceError>,
        renderer: Arc<dyn SuggestionRenderer>,
    ) -> SuggestionService {
        SuggestionService::new(
            &AdvisorConfig::default(),
            Arc::new(PoolCatalog::default()),
            Arc::new(StubVaults { outcome, delay: Duration::ZERO }),
            renderer,
        )
    }

    #[tokio::test]
    async fn test_suggest_with_template() {
        let svc = service(
            || Ok(vec![VaultPosition::new("v-1", "USDC", dec!(0.05))]),
            Arc::new(TemplateRenderer),
        );

        let suggestion = svc.suggest("u-1", "token", Asset::Usdc).await.unwrap();
        assert_eq!(suggestion.fact.kind(), "MOVE_TO_BETTER_YIELD");
        assert!(suggestion.text.contains("Solend (Solana)"));
        assert!(suggestion.text.contains("~1.2% more APY"));
    }

    #[tokio::test]
    async fn test_unauthorized_is_surfaced() {
        let svc = service(
            || Err(SourceError::Unauthorized("expired".into())),
            Arc::new(TemplateRenderer),
        );

        let result = svc.suggest("u-1", "token", Asset::Usdc).await;
        assert!(matches!(
            result,
            Err(AdvisorError::Upstream(SourceError::Unauthorized(_)))
        ));
    }

    #[tokio::test]
    async fn test_other_failures_render_error_fact() {
        let svc = service(
            || Err(SourceError::Server { status: 503 }),
            Arc::new(TemplateRenderer),
        );

        let suggestion = svc.suggest("u-1", "token", Asset::Sol).await.unwrap();
        assert_eq!(suggestion.fact.kind(), "ERROR");
        assert_eq!(suggestion.fact.asset(), Some(Asset::Sol));
        assert!(suggestion.text.contains("your SOL"));
    }

    #[tokio::test]
    async fn test_generation_failure_is_surfaced() {
        let svc = service(
            || Ok(Vec::new()),
            Arc::new(GenerativeRenderer::new(Arc::new(StubProvider::failing()))),
        );

        let result = svc.suggest("u-1", "token", Asset::Usdt).await;
        assert!(matches!(result, Err(AdvisorError::AiGeneration(_))));
    }
}
