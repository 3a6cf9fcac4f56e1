//! # agent-core
//!
//! Provider-agnostic LLM abstraction shared by the yield co-pilot crates.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Co-pilot consumers                       │
//! │  ┌──────────────────┐  ┌──────────────┐  ┌────────────────┐  │
//! │  │ Suggestion text  │  │ Chat replies │  │ Action intents │  │
//! │  └────────┬─────────┘  └──────┬───────┘  └───────┬────────┘  │
//! │           └──────────── LlmProvider ─── ToolSchema┘           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between OpenAI, Gemini, Ollama
//! or any other backend without changing the consumers. Structured actions
//! are advertised as `ToolSchema`s and come back as `ToolCall`s; executing
//! them is left to the caller.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

pub use error::{AgentError, Result};
pub use message::{ContentPart, Message, MessageContent, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider};
pub use tool::{ParameterSchema, ToolCall, ToolSchema};
