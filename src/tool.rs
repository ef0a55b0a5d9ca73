//! Boundary for hosts that expose the analyzer as a callable tool.
//!
//! The host owns transport and registration; this module only describes the
//! tool and maps a JSON parameter object onto [`analyze_text`](crate::analyze_text).

use serde::Serialize;
use serde_json::{json, Value};

use crate::{analyze_text, GatewayError, GatewayErrorResponse, ToolResponse};

pub const TOOL_NAME: &str = "analyze_text_tool";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn analyze_text() -> Self {
        Self {
            name: TOOL_NAME.to_string(),
            description: "Count Chinese characters, English letters and words, check bracket \
                          symmetry, validate JSON and measure its depth, and summarize Markdown \
                          structure."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "input": {
                        "type": "string",
                        "description": "Text to analyze"
                    }
                },
                "required": ["input"]
            }),
        }
    }
}

/// Handle a tool call whose parameters look like `{"input": "..."}`.
pub fn call_tool(params: &Value) -> Value {
    let response = match params.get("input").and_then(Value::as_str) {
        Some(text) => analyze_text(text),
        None => ToolResponse::Error(GatewayErrorResponse::new(
            GatewayError::MissingInput.to_string(),
            None,
        )),
    };
    serde_json::to_value(&response).unwrap_or_else(|err| {
        json!({
            "error": true,
            "message": "Failed to serialize analysis result",
            "details": err.to_string(),
        })
    })
}
