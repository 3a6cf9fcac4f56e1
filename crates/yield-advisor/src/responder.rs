//! Conversational Responder
//!
//! Answers one chat turn and reconciles the model's text with an optional
//! structured action. Collaborator failures never escape: the user always
//! gets a non-empty reply.

use std::sync::Arc;

use agent_core::LlmProvider;
use async_trait::async_trait;
use serde::Serialize;

use crate::intent::{ActionIntent, action_tools};
use crate::prompts;

pub const CHAT_UNAVAILABLE: &str =
    "I'm currently unable to process chat messages. Please try again later.";
pub const PROVIDER_ERROR_REPLY: &str =
    "Sorry, I encountered an issue while trying to respond. Please try asking differently.";
pub const CLARIFICATION_REPLY: &str = "I understood your request but had a slight issue \
processing the details. Could you try rephrasing?";
pub const EMPTY_REPLY: &str =
    "Sorry, I couldn't come up with a response just now. Could you try asking again?";

/// Reply text plus at most one validated action
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatReply {
    pub text: String,
    pub action: Option<ActionIntent>,
}

impl ChatReply {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: None,
        }
    }
}

/// Produces chat replies (Strategy pattern)
#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn respond(&self, user_message: &str, context: &str) -> ChatReply;

    fn name(&self) -> String;
}

/// Pick the responder for this process: generative when a provider exists.
pub fn responder_for(provider: Option<Arc<dyn LlmProvider>>) -> Arc<dyn ChatResponder> {
    match provider {
        Some(provider) => {
            if !provider.info().supports_tools {
                tracing::warn!(provider = %provider.info(), "Provider has no tool support; chat is text-only");
            }
            Arc::new(GenerativeResponder::new(provider))
        }
        None => {
            tracing::warn!("No LLM configured. Chat is unavailable.");
            Arc::new(UnavailableResponder)
        }
    }
}

pub struct GenerativeResponder {
    provider: Arc<dyn LlmProvider>,
}

impl GenerativeResponder {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ChatResponder for GenerativeResponder {
    async fn respond(&self, user_message: &str, context: &str) -> ChatReply {
        let messages = prompts::chat_messages(user_message, context);
        let options = self.provider.default_options();
        let tools = action_tools();

        tracing::info!(provider = %self.provider.info(), "Generating chat response");
        tracing::debug!(%context, "Chat context");

        let completion = match self.provider.complete(&messages, &options, &tools).await {
            Ok(completion) => completion,
            Err(e) => {
                tracing::error!("Error generating chat response: {}", e);
                return ChatReply::text_only(PROVIDER_ERROR_REPLY);
            }
        };

        let mut text = completion.text();
        let mut action = None;

        if let Some((first, rest)) = completion.tool_calls.split_first() {
            if !rest.is_empty() {
                tracing::warn!(ignored = rest.len(), "Only the first tool call is used");
            }

            tracing::info!(tool = %first.name, "Model proposed an action");
            match ActionIntent::from_tool_call(first) {
                Ok(intent) => action = Some(intent),
                Err(e) => {
                    tracing::warn!(tool = %first.name, "Dropping invalid action: {}", e);
                    if text.is_empty() {
                        text = CLARIFICATION_REPLY.into();
                    }
                }
            }
        }

        if text.is_empty() {
            text = action
                .as_ref()
                .map_or_else(|| EMPTY_REPLY.to_string(), ActionIntent::describe);
        }

        ChatReply { text, action }
    }

    fn name(&self) -> String {
        format!("generative: {}", self.provider.info())
    }
}

/// Used when no LLM is configured
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableResponder;

#[async_trait]
impl ChatResponder for UnavailableResponder {
    async fn respond(&self, _user_message: &str, _context: &str) -> ChatReply {
        ChatReply::text_only(CHAT_UNAVAILABLE)
    }

    fn name(&self) -> String {
        "unavailable".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{DEPOSIT_TOOL, SWAP_TOOL};
    use crate::model::Asset;
    use crate::testing::StubProvider;
    use agent_core::{Completion, ContentPart, MessageContent, ToolCall};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn deposit_call(amount: serde_json::Value) -> ToolCall {
        ToolCall::new(DEPOSIT_TOOL)
            .with_argument("amount", amount)
            .with_argument("token", json!("USDC"))
    }

    async fn reply_from(provider: StubProvider) -> ChatReply {
        GenerativeResponder::new(Arc::new(provider))
            .respond("deposit 100 usdc", "User has no vaults yet.")
            .await
    }

    #[tokio::test]
    async fn test_plain_text_reply() {
        let reply = reply_from(StubProvider::text("You have 1.5 SOL in your wallet.")).await;
        assert_eq!(reply, ChatReply::text_only("You have 1.5 SOL in your wallet."));
    }

    #[tokio::test]
    async fn test_valid_action_with_text() {
        let reply = reply_from(StubProvider::with_tool_call(
            "Setting up your deposit now.",
            deposit_call(json!(100)),
        ))
        .await;

        assert_eq!(reply.text, "Setting up your deposit now.");
        assert_eq!(
            reply.action,
            Some(ActionIntent::DepositVault {
                amount: dec!(100),
                token: Asset::Usdc,
                target_vault_id: None,
            })
        );
    }

    #[tokio::test]
    async fn test_valid_action_without_text_gets_description() {
        let reply = reply_from(StubProvider::with_tool_call("", deposit_call(json!(100)))).await;
        assert_eq!(reply.text, "I've prepared a deposit of 100 USDC for you to review.");
        assert!(reply.action.is_some());
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_dropped() {
        let reply = reply_from(StubProvider::with_tool_call("", deposit_call(json!(0)))).await;
        assert_eq!(reply.text, CLARIFICATION_REPLY);
        assert_eq!(reply.action, None);

        let with_text =
            reply_from(StubProvider::with_tool_call("Sure thing!", deposit_call(json!(-3)))).await;
        assert_eq!(with_text.text, "Sure thing!");
        assert_eq!(with_text.action, None);
    }

    #[tokio::test]
    async fn test_only_first_tool_call_is_used() {
        let completion = Completion {
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: "You'll need to swap first.".into() },
                ContentPart::Other,
            ]),
            tool_calls: vec![
                ToolCall::new(SWAP_TOOL)
                    .with_argument("amount", json!(0.5))
                    .with_argument("from_token", json!("SOL"))
                    .with_argument("to_token", json!("USDC")),
                deposit_call(json!(50)),
            ],
            ..Default::default()
        };

        let reply = reply_from(StubProvider::completion(completion)).await;
        assert_eq!(reply.text, "You'll need to swap first.");
        assert!(matches!(reply.action, Some(ActionIntent::SwapTokens { .. })));
    }

    #[tokio::test]
    async fn test_provider_error_gives_apology() {
        let reply = reply_from(StubProvider::failing()).await;
        assert_eq!(reply, ChatReply::text_only(PROVIDER_ERROR_REPLY));
    }

    #[tokio::test]
    async fn test_empty_completion_gets_apology() {
        let reply = reply_from(StubProvider::text("   ")).await;
        assert_eq!(reply.text, EMPTY_REPLY);
        assert_eq!(reply.action, None);
    }

    #[tokio::test]
    async fn test_tools_and_context_are_sent() {
        let provider = Arc::new(StubProvider::text("ok"));
        GenerativeResponder::new(provider.clone())
            .respond("what's my balance?", "User's Wallet Balances:\n- Wallet: 1.5000 SOL")
            .await;

        let tools: Vec<String> = provider.last_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(tools, vec![DEPOSIT_TOOL, SWAP_TOOL]);
        assert!(provider.last_messages()[1].content.contains("1.5000 SOL"));
    }

    #[tokio::test]
    async fn test_unavailable_responder() {
        let reply = UnavailableResponder.respond("hi", "").await;
        assert_eq!(reply, ChatReply::text_only(CHAT_UNAVAILABLE));
        assert_eq!(responder_for(None).name(), "unavailable");
    }
}
