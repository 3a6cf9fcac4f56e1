//! Error Types for the Yield Advisor

use thiserror::Error;

use crate::sources::SourceError;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Tool-call arguments that do not form a valid action
    #[error("Invalid action: {0}")]
    Validation(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] SourceError),

    /// The generative renderer failed; surfaced to the caller
    #[error("AI generation failed: {0}")]
    AiGeneration(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AdvisorError {
    /// Sentence safe to show an end user
    pub fn user_message(&self) -> String {
        match self {
            AdvisorError::Validation(_) => {
                "I couldn't prepare that action. Could you rephrase the request?".into()
            }
            AdvisorError::Upstream(e) => format!("We hit a {} while loading your account.", e.category()),
            AdvisorError::AiGeneration(_) => {
                "Failed to generate AI suggestion text.".into()
            }
            AdvisorError::Config(_) => "The service is misconfigured.".into(),
        }
    }
}
