//! Gemini LLM Provider
//!
//! Implementation of `LlmProvider` over Google's `generateContent` REST API.
//! System messages become the `systemInstruction`; tools are advertised as
//! function declarations.

use std::collections::HashMap;

use agent_core::{
    error::Result,
    message::{ContentPart, Message, MessageContent, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ProviderInfo, TokenUsage},
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::http::{build_client, ensure_success, transport_error};

/// Gemini provider configuration
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-1.5-flash-latest".into(),
            timeout_secs: 60,
        }
    }

    /// Read `GOOGLE_API_KEY` and `LLM_MODEL_NAME_GEMINI`.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("LLM_MODEL_NAME_GEMINI") {
            config.model = model;
        }
        Some(config)
    }
}

/// Gemini LLM provider
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            config,
        })
    }

    fn build_request(
        messages: &[Message],
        options: &GenerationOptions,
        tools: &[ToolSchema],
    ) -> GenerateRequest {
        let system: Vec<TextPart> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| TextPart { text: m.content.clone() })
            .collect();

        let contents = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| Content {
                role: if m.role == Role::Assistant { "model" } else { "user" },
                parts: vec![TextPart { text: m.content.clone() }],
            })
            .collect();

        let tools = if tools.is_empty() {
            Vec::new()
        } else {
            vec![ToolDeclarations {
                function_declarations: tools
                    .iter()
                    .map(|schema| FunctionDeclaration {
                        name: schema.name.clone(),
                        description: schema.description.clone(),
                        parameters: upper_case_types(schema.parameters_json_schema()),
                    })
                    .collect(),
            }]
        };

        GenerateRequest {
            system_instruction: (!system.is_empty()).then_some(SystemInstruction { parts: system }),
            contents,
            tools,
            generation_config: GenerationConfig {
                temperature: options.temperature,
                top_p: options.top_p,
                max_output_tokens: options.max_tokens,
            },
        }
    }

    fn convert_response(response: GenerateResponse, fallback_model: &str) -> Completion {
        let usage = response.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });
        let model = response
            .model_version
            .unwrap_or_else(|| fallback_model.to_string());

        let Some(candidate) = response.candidates.into_iter().next() else {
            return Completion {
                model,
                usage,
                finish_reason: Some(FinishReason::Error),
                ..Default::default()
            };
        };

        let mut text_parts = Vec::new();
        let mut tool_calls = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(text) = part.text {
                text_parts.push(ContentPart::Text { text });
            }
            if let Some(call) = part.function_call {
                tool_calls.push(ToolCall {
                    name: call.name,
                    arguments: call.args,
                    id: None,
                });
            }
        }

        let finish_reason = if tool_calls.is_empty() {
            candidate.finish_reason.as_deref().map(FinishReason::parse)
        } else {
            Some(FinishReason::ToolUse)
        };

        Completion {
            content: MessageContent::Parts(text_parts),
            tool_calls,
            model,
            usage,
            finish_reason,
        }
    }
}

/// Gemini's schema dialect spells types in upper case.
fn upper_case_types(mut schema: serde_json::Value) -> serde_json::Value {
    if let Some(kind) = schema.get("type").and_then(|t| t.as_str()) {
        schema["type"] = serde_json::Value::String(kind.to_ascii_uppercase());
    }
    if let Some(properties) = schema.get_mut("properties").and_then(|p| p.as_object_mut()) {
        for prop in properties.values_mut() {
            *prop = upper_case_types(prop.take());
        }
    }
    schema
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Gemini".into(),
            model: self.config.model.clone(),
            supports_tools: true,
        }
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/models/{}", self.config.base_url, self.config.model))
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await;

        match response {
            Ok(r) => Ok(r.status().is_success()),
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
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
            .post(format!(
                "{}/models/{}:generateContent",
                self.config.base_url, options.model
            ))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let body: GenerateResponse = ensure_success(response)
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
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDeclarations>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<TextPart>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<TextPart>,
}

#[derive(Serialize)]
struct TextPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclarations {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartIn>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartIn {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    function_call: Option<FunctionCallIn>,
}

#[derive(Deserialize)]
struct FunctionCallIn {
    name: String,
    #[serde(default)]
    args: HashMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}
