//! # agent-runtime
//!
//! Runtime providers for the yield co-pilot.
//!
//! ## Providers
//!
//! - **OpenAI**: chat completions with function calling
//! - **Gemini**: Google `generateContent` with function declarations
//! - **Ollama** (feature `ollama`): local inference, text only
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{LlmSettings, select_provider};
//!
//! let settings = LlmSettings::from_env();
//! match select_provider(&settings)? {
//!     Some(provider) => tracing::info!("LLM: {}", provider.info()),
//!     None => tracing::warn!("No LLM configured, using fallbacks"),
//! }
//! ```

mod http;
pub mod gemini;
pub mod openai;

#[cfg(feature = "ollama")]
pub mod ollama;

use std::sync::Arc;

pub use gemini::{GeminiConfig, GeminiProvider};
pub use openai::{OpenAiConfig, OpenAiProvider};

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

// Re-export core types for convenience
pub use agent_core::{AgentError, Completion, GenerationOptions, LlmProvider, Message, Result};

/// Which LLM backends are configured for this process.
///
/// Read once at startup; the chosen provider is then injected into the
/// consumers and never re-selected per call.
#[derive(Clone, Debug, Default)]
pub struct LlmSettings {
    pub openai: Option<OpenAiConfig>,
    pub gemini: Option<GeminiConfig>,
    #[cfg(feature = "ollama")]
    pub ollama: Option<OllamaConfig>,
}

impl LlmSettings {
    /// Collect provider settings from the environment.
    ///
    /// OpenAI and Gemini are enabled by their API keys. Ollama is opt-in via
    /// `LLM_PROVIDER=ollama` since it needs no credentials.
    pub fn from_env() -> Self {
        let wants_ollama = std::env::var("LLM_PROVIDER")
            .map(|p| p.trim().eq_ignore_ascii_case("ollama"))
            .unwrap_or(false);

        #[cfg(not(feature = "ollama"))]
        if wants_ollama {
            tracing::warn!("LLM_PROVIDER=ollama requested but the 'ollama' feature is disabled");
        }

        Self {
            openai: OpenAiConfig::from_env(),
            gemini: GeminiConfig::from_env(),
            #[cfg(feature = "ollama")]
            ollama: wants_ollama.then(OllamaConfig::from_env),
        }
    }
}

/// Pick the first configured provider: OpenAI, then Gemini, then Ollama.
///
/// Returns `Ok(None)` when nothing is configured. A provider whose client
/// cannot be built is logged and skipped in favour of the next one.
pub fn select_provider(settings: &LlmSettings) -> Result<Option<Arc<dyn LlmProvider>>> {
    if let Some(config) = &settings.openai {
        match OpenAiProvider::new(config.clone()) {
            Ok(provider) => return Ok(Some(Arc::new(provider))),
            Err(e) => tracing::error!("Failed to initialize OpenAI provider: {}. Trying Gemini.", e),
        }
    }

    if let Some(config) = &settings.gemini {
        match GeminiProvider::new(config.clone()) {
            Ok(provider) => return Ok(Some(Arc::new(provider))),
            Err(e) => tracing::error!("Failed to initialize Gemini provider: {}", e),
        }
    }

    #[cfg(feature = "ollama")]
    if let Some(config) = &settings.ollama {
        return Ok(Some(Arc::new(OllamaProvider::from_config(config.clone()))));
    }

    Ok(None)
}
