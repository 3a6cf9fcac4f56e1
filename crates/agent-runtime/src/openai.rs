//! OpenAI LLM Provider
//!
//! Implementation of `LlmProvider` over the OpenAI chat completions API
//! (or any endpoint speaking the same dialect), with function calling.

use std::collections::HashMap;

use agent_core::{
    error::Result,
    message::{Message, MessageContent},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ProviderInfo, TokenUsage},
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::http::{build_client, ensure_success, transport_error};

/// OpenAI provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token
    pub api_key: String,

    /// API base URL (without trailing slash)
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            timeout_secs: 60,
        }
    }

    /// Read `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `LLM_MODEL_NAME_OPENAI`.
    /// Returns `None` when no key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Ok(model) = std::env::var("LLM_MODEL_NAME_OPENAI") {
            config.model = model;
        }
        Some(config)
    }
}

/// OpenAI LLM provider
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            config,
        })
    }

    fn build_request<'a>(
        messages: &'a [Message],
        options: &'a GenerationOptions,
        tools: &[ToolSchema],
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: &options.model,
            messages: messages
                .iter()
                .map(|m| ChatMessageOut {
                    role: m.role.to_string(),
                    content: &m.content,
                })
                .collect(),
            temperature: options.temperature,
            top_p: options.top_p,
            max_tokens: options.max_tokens,
            tools: tools
                .iter()
                .map(|schema| FunctionTool {
                    kind: "function",
                    function: FunctionDef {
                        name: schema.name.clone(),
                        description: schema.description.clone(),
                        parameters: schema.parameters_json_schema(),
                    },
                })
                .collect(),
        }
    }

    fn convert_response(response: ChatResponse, fallback_model: &str) -> Completion {
        let usage = response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        let model = response.model.unwrap_or_else(|| fallback_model.to_string());

        let Some(choice) = response.choices.into_iter().next() else {
            return Completion {
                model,
                usage,
                finish_reason: Some(FinishReason::Error),
                ..Default::default()
            };
        };

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                arguments: parse_arguments(&call.function.name, &call.function.arguments),
                name: call.function.name,
                id: call.id,
            })
            .collect();

        Completion {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            model,
            usage,
            finish_reason: choice.finish_reason.as_deref().map(FinishReason::parse),
        }
    }
}

/// Function arguments arrive as a JSON-encoded string. Unparseable arguments
/// become an empty map so the caller's validation rejects the call.
fn parse_arguments(name: &str, raw: &str) -> HashMap<String, serde_json::Value> {
    if raw.trim().is_empty() {
        return HashMap::new();
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(tool = %name, "Unparseable tool arguments from OpenAI: {}", e);
        HashMap::new()
    })
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "OpenAI".into(),
            model: self.config.model.clone(),
            supports_tools: true,
        }
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await;

        match response {
            Ok(r) => Ok(r.status().is_success()),
            Err(e) => {
                tracing::warn!("OpenAI health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
        tools: &[ToolSchema],
    ) -> Result<Completion> {
        let request = Self::build_request(messages, options, tools);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let body: ChatResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| transport_error(&e))?;

        Ok(Self::convert_response(body, &options.model))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessageOut<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<FunctionTool>,
}

#[derive(Serialize)]
struct ChatMessageOut<'a> {
    role: String,
    content: &'a str,
}

#[derive(Serialize)]
struct FunctionTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionDef,
}

#[derive(Serialize)]
struct FunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<MessageContent>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallIn>>,
}

#[derive(Deserialize)]
struct ToolCallIn {
    #[serde(default)]
    id: Option<String>,
    function: FunctionCallIn,
}

#[derive(Deserialize)]
struct FunctionCallIn {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
