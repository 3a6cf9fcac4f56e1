//! Suggestion Text Rendering
//!
//! Turns a `SuggestionFact` into one or two sentences for the user. The
//! generative renderer asks the configured LLM; the template renderer is
//! deterministic and used when no LLM is configured. The choice is made once
//! when the service is assembled.

use std::sync::Arc;

use agent_core::LlmProvider;
use async_trait::async_trait;

use crate::error::{AdvisorError, Result};
use crate::prompts;
use crate::suggestion::SuggestionFact;

/// Renders a suggestion fact as user-facing prose (Strategy pattern)
#[async_trait]
pub trait SuggestionRenderer: Send + Sync {
    async fn render(&self, fact: &SuggestionFact) -> Result<String>;

    /// Short name for logs and health output
    fn name(&self) -> String;
}

/// Pick the renderer for this process: generative when a provider exists.
pub fn renderer_for(provider: Option<Arc<dyn LlmProvider>>) -> Arc<dyn SuggestionRenderer> {
    match provider {
        Some(provider) => Arc::new(GenerativeRenderer::new(provider)),
        None => {
            tracing::warn!("No LLM configured. Using template suggestions.");
            Arc::new(TemplateRenderer)
        }
    }
}

/// LLM-backed renderer. Failures surface as `AiGeneration`; it never falls
/// back to templates mid-call.
pub struct GenerativeRenderer {
    provider: Arc<dyn LlmProvider>,
}

impl GenerativeRenderer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl SuggestionRenderer for GenerativeRenderer {
    async fn render(&self, fact: &SuggestionFact) -> Result<String> {
        let messages = prompts::suggestion_messages(fact)?;
        let options = self.provider.default_options();

        tracing::info!(kind = fact.kind(), provider = %self.provider.info(), "Generating suggestion text");

        let completion = self
            .provider
            .complete(&messages, &options, &[])
            .await
            .map_err(|e| {
                tracing::error!("Error generating suggestion text: {}", e);
                AdvisorError::AiGeneration(e.to_string())
            })?;

        let text = completion.text();
        if text.is_empty() {
            return Err(AdvisorError::AiGeneration("provider returned no text".into()));
        }

        tracing::debug!(%text, "Suggestion text generated");
        Ok(text)
    }

    fn name(&self) -> String {
        format!("generative: {}", self.provider.info())
    }
}

/// Deterministic sentences per suggestion kind
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    pub fn sentence(fact: &SuggestionFact) -> String {
        match fact {
            SuggestionFact::MoveToBetterYield {
                asset,
                current_apy,
                apy,
                apy_gain,
                protocol_name,
                ..
            } => format!(
                "You could earn ~{apy_gain:.1}% more APY by moving your {asset} from your current \
                 vault (at {current_apy:.1}%) to {protocol_name} (at {apy:.1}%)."
            ),
            SuggestionFact::HoldCurrent { asset, apy, protocol_name, .. } => format!(
                "Your current {asset} vault '{protocol_name}' is performing well at {apy:.1}% APY. \
                 Holding seems like a good strategy for now."
            ),
            SuggestionFact::DepositToBest { asset, apy, protocol_name, .. } => format!(
                "Found a good starting opportunity for your {asset} with {protocol_name} offering \
                 around {apy:.1}% APY."
            ),
            SuggestionFact::NoSuggestion { asset, .. } => format!(
                "I couldn't find any {asset} yield opportunities that fit your risk profile right \
                 now, so there's nothing to change for the moment."
            ),
            SuggestionFact::Error { asset, .. } => {
                let subject = asset.map_or_else(|| "holdings".to_string(), |a| a.to_string());
                format!(
                    "I had trouble analyzing the best options for your {subject} right now. \
                     Please try again in a moment."
                )
            }
        }
    }
}

#[async_trait]
impl SuggestionRenderer for TemplateRenderer {
    async fn render(&self, fact: &SuggestionFact) -> Result<String> {
        Ok(Self::sentence(fact))
    }

    fn name(&self) -> String {
        "template".into()
    }
}
