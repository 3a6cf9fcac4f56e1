//! Action Intents
//!
//! Structured financial actions the conversational model may propose.
//! They are advertised as tool schemas and only ever built by validating a
//! returned tool call; nothing here executes an action.

use std::str::FromStr;

use agent_core::tool::{ParameterSchema, ToolCall, ToolSchema};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AdvisorError, Result};
use crate::model::Asset;

pub const DEPOSIT_TOOL: &str = "DepositActionIntent";
pub const SWAP_TOOL: &str = "SwapActionIntent";

const TOKEN_ARGS: [&str; 3] = ["token", "from_token", "to_token"];

/// A validated action proposal
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionIntent {
    DepositVault {
        #[serde(with = "rust_decimal::serde::float")]
        amount: Decimal,
        token: Asset,
        #[serde(skip_serializing_if = "Option::is_none")]
        target_vault_id: Option<String>,
    },
    SwapTokens {
        #[serde(with = "rust_decimal::serde::float")]
        amount: Decimal,
        from_token: Asset,
        to_token: Asset,
    },
}

/// Schemas offered to the model during chat
pub fn action_tools() -> Vec<ToolSchema> {
    let symbols: Vec<&str> = Asset::ALL.iter().map(|a| a.symbol()).collect();

    vec![
        ToolSchema {
            name: DEPOSIT_TOOL.into(),
            description: "Prepare a deposit of tokens from the user's wallet into a Senti vault. \
                          Use when the user asks to deposit or save funds."
                .into(),
            parameters: vec![
                ParameterSchema::required("amount", "number", "Amount of tokens to deposit, greater than zero"),
                ParameterSchema::required("token", "string", "Token to deposit").one_of(&symbols),
                ParameterSchema::optional("target_vault_id", "string", "Vault to deposit into, if the user named one"),
            ],
        },
        ToolSchema {
            name: SWAP_TOOL.into(),
            description: "Prepare a swap between two tokens in the user's wallet. Use when the user \
                          asks to swap or convert, or when a swap is needed before a deposit."
                .into(),
            parameters: vec![
                ParameterSchema::required("amount", "number", "Amount of from_token to swap, greater than zero"),
                ParameterSchema::required("from_token", "string", "Token to sell").one_of(&symbols),
                ParameterSchema::required("to_token", "string", "Token to receive").one_of(&symbols),
            ],
        },
    ]
}

impl ActionIntent {
    /// Validate a tool call and turn it into an intent.
    ///
    /// Token symbols are accepted in any case. Amounts may arrive as JSON
    /// numbers or numeric strings and must be positive.
    pub fn from_tool_call(call: &ToolCall) -> Result<Self> {
        let schema = action_tools()
            .into_iter()
            .find(|s| s.name == call.name)
            .ok_or_else(|| AdvisorError::Validation(format!("unknown action '{}'", call.name)))?;

        let call = normalize_tokens(call);
        schema
            .validate(&call)
            .map_err(|e| AdvisorError::Validation(e.to_string()))?;

        let amount = positive_amount(&call)?;

        if call.name == DEPOSIT_TOOL {
            let target_vault_id = call
                .arguments
                .get("target_vault_id")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from);

            return Ok(ActionIntent::DepositVault {
                amount,
                token: asset_arg(&call, "token")?,
                target_vault_id,
            });
        }

        let from_token = asset_arg(&call, "from_token")?;
        let to_token = asset_arg(&call, "to_token")?;
        if from_token == to_token {
            return Err(AdvisorError::Validation(format!(
                "cannot swap {from_token} into itself"
            )));
        }

        Ok(ActionIntent::SwapTokens {
            amount,
            from_token,
            to_token,
        })
    }

    /// One-sentence description, used when the model gave no text
    pub fn describe(&self) -> String {
        match self {
            ActionIntent::DepositVault { amount, token, target_vault_id } => match target_vault_id {
                Some(vault) => format!(
                    "I've prepared a deposit of {} {token} into vault '{vault}' for you to review.",
                    amount.normalize()
                ),
                None => format!(
                    "I've prepared a deposit of {} {token} for you to review.",
                    amount.normalize()
                ),
            },
            ActionIntent::SwapTokens { amount, from_token, to_token } => format!(
                "I've prepared a swap of {} {from_token} to {to_token} for you to review.",
                amount.normalize()
            ),
        }
    }
}

fn normalize_tokens(call: &ToolCall) -> ToolCall {
    let mut call = call.clone();
    for key in TOKEN_ARGS {
        if let Some(Value::String(symbol)) = call.arguments.get_mut(key) {
            *symbol = symbol.trim().to_ascii_uppercase();
        }
    }
    call
}

fn positive_amount(call: &ToolCall) -> Result<Decimal> {
    let amount = match call.arguments.get("amount") {
        Some(Value::Number(n)) => {
            let raw = n.to_string();
            Decimal::from_str(&raw)
                .or_else(|_| Decimal::from_scientific(&raw))
                .ok()
        }
        Some(Value::String(s)) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
    .ok_or_else(|| AdvisorError::Validation("amount must be a number".into()))?;

    if amount <= Decimal::ZERO {
        return Err(AdvisorError::Validation(format!(
            "amount must be greater than zero, got {amount}"
        )));
    }
    Ok(amount)
}

fn asset_arg(call: &ToolCall, key: &str) -> Result<Asset> {
    call.arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AdvisorError::Validation(format!("{key} must be a token symbol")))?
        .parse()
        .map_err(AdvisorError::Validation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_deposit_from_tool_call() {
        let call = ToolCall::new(DEPOSIT_TOOL)
            .with_argument("amount", json!(100))
            .with_argument("token", json!("usdc"))
            .with_argument("target_vault_id", json!("main-yield-vault"));

        let intent = ActionIntent::from_tool_call(&call).unwrap();
        assert_eq!(
            intent,
            ActionIntent::DepositVault {
                amount: dec!(100),
                token: Asset::Usdc,
                target_vault_id: Some("main-yield-vault".into()),
            }
        );

        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["action_type"], "DEPOSIT_VAULT");
        assert_eq!(json["amount"], 100.0);
        assert_eq!(json["token"], "USDC");
    }

    #[test]
    fn test_swap_from_tool_call_with_string_amount() {
        let call = ToolCall::new(SWAP_TOOL)
            .with_argument("amount", json!("0.5"))
            .with_argument("from_token", json!("SOL"))
            .with_argument("to_token", json!("USDC"));

        let intent = ActionIntent::from_tool_call(&call).unwrap();
        assert_eq!(
            intent,
            ActionIntent::SwapTokens {
                amount: dec!(0.5),
                from_token: Asset::Sol,
                to_token: Asset::Usdc,
            }
        );
        assert_eq!(
            intent.describe(),
            "I've prepared a swap of 0.5 SOL to USDC for you to review."
        );
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        for amount in [json!(0), json!(-5), json!("abc")] {
            let call = ToolCall::new(DEPOSIT_TOOL)
                .with_argument("amount", amount)
                .with_argument("token", json!("USDT"));
            assert!(matches!(
                ActionIntent::from_tool_call(&call),
                Err(AdvisorError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_rejects_missing_fields_and_unknown_tokens() {
        let missing = ToolCall::new(DEPOSIT_TOOL).with_argument("amount", json!(10));
        assert!(ActionIntent::from_tool_call(&missing).is_err());

        let unknown = ToolCall::new(SWAP_TOOL)
            .with_argument("amount", json!(1))
            .with_argument("from_token", json!("DOGE"))
            .with_argument("to_token", json!("USDC"));
        assert!(ActionIntent::from_tool_call(&unknown).is_err());
    }

    #[test]
    fn test_rejects_same_token_swap() {
        let call = ToolCall::new(SWAP_TOOL)
            .with_argument("amount", json!(1))
            .with_argument("from_token", json!("SOL"))
            .with_argument("to_token", json!("sol"));
        assert!(ActionIntent::from_tool_call(&call).is_err());
    }

    #[test]
    fn test_rejects_unknown_tool() {
        let call = ToolCall::new("WithdrawActionIntent").with_argument("amount", json!(1));
        assert!(ActionIntent::from_tool_call(&call).is_err());
    }

    #[test]
    fn test_blank_vault_id_is_dropped() {
        let call = ToolCall::new(DEPOSIT_TOOL)
            .with_argument("amount", json!(25.5))
            .with_argument("token", json!("SOL"))
            .with_argument("target_vault_id", json!("  "));

        let intent = ActionIntent::from_tool_call(&call).unwrap();
        assert_eq!(
            intent.describe(),
            "I've prepared a deposit of 25.5 SOL for you to review."
        );
    }

    #[test]
    fn test_tool_schemas() {
        let tools = action_tools();
        assert_eq!(tools.len(), 2);
        let deposit = tools[0].parameters_json_schema();
        assert_eq!(deposit["required"], json!(["amount", "token"]));
        assert_eq!(deposit["properties"]["token"]["enum"], json!(["USDC", "USDT", "SOL"]));
    }
}
