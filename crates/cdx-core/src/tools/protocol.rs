//! Wire types for the tool surface.

use serde::{Deserialize, Serialize};

/// Tool descriptor advertised to an LLM agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Content block returned from tool calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl ToolContent {
    /// A `text` block carrying pretty-printed JSON.
    pub fn json<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        Ok(ToolContent {
            content_type: "text".to_string(),
            text: serde_json::to_string_pretty(value)?,
        })
    }
}
