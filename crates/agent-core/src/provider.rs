//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for all LLM providers (OpenAI, Gemini, Ollama, etc.)
//! allowing the co-pilot to work with any backend without code changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = OpenAiProvider::new(config);
//! let completion = provider.complete(&messages, &options, &tools).await?;
//! println!("{}", completion.text());
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::{Message, MessageContent};
use crate::tool::{ToolCall, ToolSchema};

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "gpt-4o-mini", "gemini-1.5-flash-latest", "llama3.2")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Top-p nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 1024 }
fn default_top_p() -> f32 { 0.9 }

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

impl GenerationOptions {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Completion {
    /// The generated content
    pub content: MessageContent,

    /// Structured tool invocations proposed by the model, in provider order
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// Plain-text completion with no tool calls
    pub fn text_only(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: MessageContent::Text(content.into()),
            model: model.into(),
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        }
    }

    /// Textual reply, parts concatenated and trimmed
    pub fn text(&self) -> String {
        self.content.text()
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolUse,
    ContentFilter,
    Error,
}

impl FinishReason {
    /// Map the finish strings used by OpenAI-style and Gemini APIs.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "stop" | "end_turn" => FinishReason::Stop,
            "length" | "max_tokens" => FinishReason::Length,
            "tool_calls" | "function_call" | "tool_use" => FinishReason::ToolUse,
            "content_filter" | "safety" => FinishReason::ContentFilter,
            _ => FinishReason::Error,
        }
    }
}

/// Provider metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "OpenAI", "Gemini")
    pub name: String,

    /// Default model the provider was configured with
    pub model: String,

    /// Whether tool/function calling is supported
    pub supports_tools: bool,
}

impl std::fmt::Display for ProviderInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.model)
    }
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
/// Consumers work exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider information and capabilities
    fn info(&self) -> ProviderInfo;

    /// Check if the provider is reachable and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// Generate a completion from messages.
    ///
    /// `tools` lists the structured actions the model may propose. Providers
    /// without function calling ignore it and return no tool calls.
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
        tools: &[ToolSchema],
    ) -> Result<Completion>;

    /// Default generation options for this provider's configured model
    fn default_options(&self) -> GenerationOptions {
        GenerationOptions::for_model(self.info().model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ContentPart;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.temperature, 0.7);
        assert_eq!(opts.max_tokens, 1024);
        assert_eq!(opts.model, "gpt-4o-mini");
    }

    #[test]
    fn test_completion_text_from_parts() {
        let completion = Completion {
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: " Swapping first. ".into() },
                ContentPart::Other,
            ]),
            ..Default::default()
        };
        assert_eq!(completion.text(), "Swapping first.");
    }

    #[test]
    fn test_finish_reason_parse() {
        assert_eq!(FinishReason::parse("tool_calls"), FinishReason::ToolUse);
        assert_eq!(FinishReason::parse("STOP"), FinishReason::Stop);
        assert_eq!(FinishReason::parse("SAFETY"), FinishReason::ContentFilter);
        assert_eq!(FinishReason::parse("weird"), FinishReason::Error);
    }
}
