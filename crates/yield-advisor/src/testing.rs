//! In-test stand-ins for the LLM provider and the data sources.

use std::sync::Mutex;
use std::time::Duration;

use agent_core::{
    AgentError, Completion, GenerationOptions, LlmProvider, Message, MessageContent, ToolCall,
    ToolSchema, provider::ProviderInfo,
};
use async_trait::async_trait;

use crate::model::{VaultPosition, WalletBalances};
use crate::sources::{BalanceSource, SourceError, VaultSource};

pub struct StubProvider {
    reply: Option<Completion>,
    seen_messages: Mutex<Vec<Message>>,
    seen_tools: Mutex<Vec<ToolSchema>>,
}

impl StubProvider {
    pub fn text(text: &str) -> Self {
        Self::completion(Completion::text_only(text, "stub-model"))
    }

    pub fn completion(completion: Completion) -> Self {
        Self {
            reply: Some(completion),
            seen_messages: Mutex::new(Vec::new()),
            seen_tools: Mutex::new(Vec::new()),
        }
    }

    pub fn with_tool_call(text: &str, call: ToolCall) -> Self {
        Self::completion(Completion {
            content: MessageContent::Text(text.into()),
            tool_calls: vec![call],
            model: "stub-model".into(),
            ..Default::default()
        })
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            seen_messages: Mutex::new(Vec::new()),
            seen_tools: Mutex::new(Vec::new()),
        }
    }

    pub fn last_messages(&self) -> Vec<Message> {
        self.seen_messages.lock().unwrap().clone()
    }

    pub fn last_tools(&self) -> Vec<ToolSchema> {
        self.seen_tools.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Stub".into(),
            model: "stub-model".into(),
            supports_tools: true,
        }
    }

    async fn health_check(&self) -> agent_core::Result<bool> {
        Ok(self.reply.is_some())
    }

    async fn complete(
        &self,
        messages: &[Message],
        _options: &GenerationOptions,
        tools: &[ToolSchema],
    ) -> agent_core::Result<Completion> {
        *self.seen_messages.lock().unwrap() = messages.to_vec();
        *self.seen_tools.lock().unwrap() = tools.to_vec();

        self.reply
            .clone()
            .ok_or_else(|| AgentError::ProviderUnavailable("stub is down".into()))
    }
}

/// Vault source returning a fixed outcome, optionally after a delay
pub struct StubVaults {
    pub outcome: fn() -> Result<Vec<VaultPosition>, SourceError>,
    pub delay: Duration,
}

#[async_trait]
impl VaultSource for StubVaults {
    async fn fetch_vaults(
        &self,
        _user_id: &str,
        _bearer: &str,
    ) -> Result<Vec<VaultPosition>, SourceError> {
        tokio::time::sleep(self.delay).await;
        (self.outcome)()
    }
}

pub struct StubBalances {
    pub outcome: fn() -> Result<Option<WalletBalances>, SourceError>,
    pub delay: Duration,
}

#[async_trait]
impl BalanceSource for StubBalances {
    async fn fetch_balances(&self, _wallet: &str) -> Result<Option<WalletBalances>, SourceError> {
        tokio::time::sleep(self.delay).await;
        (self.outcome)()
    }
}
