//! Prompt text for the generative renderer and responder.

use agent_core::Message;

use crate::error::{AdvisorError, Result};
use crate::suggestion::SuggestionFact;

/// Persona shared by every generative call
pub const PERSONA_PROMPT: &str = "You are 'Lucy,' a friendly, calm, and informed financial AI co-pilot \
for the Senti platform. Your goal is to translate structured financial data into a simple, \
reassuring, and actionable suggestion for the user. Use natural language, avoid jargon. \
Keep it concise (1-2 sentences).";

const SUGGESTION_INSTRUCTIONS: &str = r#"Generate a concise suggestion based on the analysis data you are given.
Formulate a friendly message for the user based on the `suggestion_type`:
- MOVE_TO_BETTER_YIELD: emphasize the APY gain (e.g. "earn +1.2% more") and mention the protocol_name.
- HOLD_CURRENT: reassure the user that their current unlocked vault (protocol_name) is performing well at the given APY.
- DEPOSIT_TO_BEST: recommend depositing the asset to protocol_name to start earning the given APY.
- NO_SUGGESTION: gently say there are no better safe options matching their risk profile right now.
- ERROR: apologize that an error occurred while analyzing options."#;

const CHAT_RULES: &str = r#"You are now in a conversational chat mode.
- Use the "Current User Context" to answer questions about balances, vaults and status.
- The context contains "User's Vaults" (money deposited in Senti) and "User's Wallet Balances" (money in their personal wallet).
- If the user asks to perform an action (e.g. "deposit $100", "swap SOL to USDC"), you MUST use the provided tools (`DepositActionIntent` or `SwapActionIntent`).
- Fill in the tool parameters (amount, token) from the user's message.
- If details are missing (e.g. "I want to deposit"), ask for them in your text response.
- ALWAYS provide a friendly text response in addition to using a tool.
- If the requested action is not directly possible but a prerequisite action (such as a swap) would enable it, return the tool call for that prerequisite and explain why it is needed."#;

/// Messages asking the model to phrase one suggestion fact
pub fn suggestion_messages(fact: &SuggestionFact) -> Result<Vec<Message>> {
    let data = serde_json::to_string_pretty(fact)
        .map_err(|e| AdvisorError::AiGeneration(format!("cannot serialize fact: {e}")))?;

    Ok(vec![
        Message::system(format!("{PERSONA_PROMPT}\n\n{SUGGESTION_INSTRUCTIONS}")),
        Message::user(format!("Analysis Data:\n```json\n{data}\n```")),
    ])
}

/// Messages for one chat turn
pub fn chat_messages(user_message: &str, context: &str) -> Vec<Message> {
    let context = if context.trim().is_empty() {
        "No specific context provided."
    } else {
        context
    };

    vec![
        Message::system(format!("{PERSONA_PROMPT}\n\n{CHAT_RULES}")),
        Message::user(format!(
            "User Message: {user_message}\n\nCurrent User Context:\n{context}"
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Asset;
    use agent_core::Role;

    #[test]
    fn test_suggestion_messages_embed_fact() {
        let fact = SuggestionFact::NoSuggestion {
            asset: Asset::Usdt,
            reasoning: "none".into(),
        };
        let messages = suggestion_messages(&fact).unwrap();

        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.starts_with("You are 'Lucy,'"));
        assert!(messages[1].content.contains("\"suggestion_type\": \"NO_SUGGESTION\""));
    }

    #[test]
    fn test_chat_messages_fill_missing_context() {
        let messages = chat_messages("What's my balance?", "  ");
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("SwapActionIntent"));
        assert!(messages[1].content.contains("No specific context provided."));
        assert!(messages[1].content.starts_with("User Message: What's my balance?"));
    }
}
