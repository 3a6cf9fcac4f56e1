//! Tool Schemas
//!
//! Structured actions the model may propose. Schemas are advertised to the
//! provider; proposals come back as `ToolCall`s and are validated here before
//! the caller turns them into domain types. Nothing in this crate executes a
//! tool.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AgentError, Result};

/// Tool call proposed by the LLM
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,

    /// Provider call ID, when one is supplied
    #[serde(default)]
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: HashMap::new(),
            id: None,
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.arguments.insert(key.into(), value);
        self
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Enum of allowed values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
}

impl ParameterSchema {
    pub fn required(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
            enum_values: None,
        }
    }

    pub fn optional(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| serde_json::json!(v)).collect());
        self
    }
}

/// Tool definition schema (for LLM function calling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,
}

impl ToolSchema {
    /// Render parameters as a JSON Schema object, the shape function-calling
    /// APIs expect.
    pub fn parameters_json_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        for param in &self.parameters {
            let mut prop = serde_json::json!({
                "type": param.param_type,
                "description": param.description,
            });
            if let Some(values) = &param.enum_values {
                prop["enum"] = serde_json::Value::Array(values.clone());
            }
            properties.insert(param.name.clone(), prop);
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check a proposed call against this schema: name, required parameters
    /// and enum membership.
    pub fn validate(&self, call: &ToolCall) -> Result<()> {
        if call.name != self.name {
            return Err(AgentError::ToolValidation(format!(
                "Expected tool '{}', got '{}'",
                self.name, call.name
            )));
        }

        for param in &self.parameters {
            let value = match call.arguments.get(&param.name) {
                Some(serde_json::Value::Null) | None if param.required => {
                    return Err(AgentError::ToolValidation(format!(
                        "Missing required parameter: {}",
                        param.name
                    )));
                }
                Some(value) => value,
                None => continue,
            };

            if let Some(allowed) = &param.enum_values {
                if !value.is_null() && !allowed.contains(value) {
                    return Err(AgentError::ToolValidation(format!(
                        "Parameter '{}' has unsupported value {}",
                        param.name, value
                    )));
                }
            }
        }

        tracing::debug!(tool = %call.name, "Tool call passed schema validation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer_schema() -> ToolSchema {
        ToolSchema {
            name: "transfer".into(),
            description: "Move funds".into(),
            parameters: vec![
                ParameterSchema::required("amount", "number", "How much"),
                ParameterSchema::required("token", "string", "Which token").one_of(&["USDC", "SOL"]),
                ParameterSchema::optional("memo", "string", "Free text"),
            ],
        }
    }

    #[test]
    fn test_json_schema_lists_required() {
        let schema = transfer_schema().parameters_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], serde_json::json!(["amount", "token"]));
        assert_eq!(schema["properties"]["token"]["enum"], serde_json::json!(["USDC", "SOL"]));
        assert!(schema["properties"]["memo"].get("enum").is_none());
    }

    #[test]
    fn test_validate_accepts_complete_call() {
        let call = ToolCall::new("transfer")
            .with_argument("amount", serde_json::json!(10))
            .with_argument("token", serde_json::json!("USDC"));
        assert!(transfer_schema().validate(&call).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_and_unknown_values() {
        let missing = ToolCall::new("transfer").with_argument("token", serde_json::json!("SOL"));
        assert!(transfer_schema().validate(&missing).is_err());

        let bad_enum = ToolCall::new("transfer")
            .with_argument("amount", serde_json::json!(1))
            .with_argument("token", serde_json::json!("DOGE"));
        assert!(transfer_schema().validate(&bad_enum).is_err());

        let wrong_name = ToolCall::new("withdraw");
        assert!(transfer_schema().validate(&wrong_name).is_err());
    }
}
