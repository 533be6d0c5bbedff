//! Request and response shapes at the backend boundary

use crate::types::{FinishReason, ProviderMetadata, Usage, Warning};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A chat request as handed to a backend adapter.
///
/// Settings have already been validated and merged by the caller; this crate
/// forwards them untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model_id: String,
    /// Prompt messages in the backend's message format.
    pub messages: Vec<serde_json::Value>,
    /// Tool definitions offered to the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<serde_json::Value>,
    /// Model parameters (temperature, max tokens, ...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

impl ChatRequest {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: serde_json::Value) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_tool(mut self, tool: serde_json::Value) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

/// A complete tool call returned by a non-streaming backend call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallPart {
    pub id: Option<String>,
    pub name: String,
    pub arguments: String,
}

/// What a backend returns from `generate`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallPart>,
    pub raw_finish_reason: Option<String>,
    pub usage: Option<Usage>,
    /// The vendor response envelope exactly as received.
    pub raw_envelope: serde_json::Value,
    pub headers: BTreeMap<String, String>,
}

/// One piece of generated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    ToolCall {
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        #[serde(rename = "toolName")]
        tool_name: String,
        input: String,
    },
}

/// Raw response information surfaced to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseInfo {
    pub headers: BTreeMap<String, String>,
    pub body: serde_json::Value,
}

/// Result of a non-streaming generate call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResult {
    pub content: Vec<ContentPart>,
    pub finish_reason: FinishReason,
    pub usage: Usage,
    pub warnings: Vec<Warning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
    pub response: ResponseInfo,
}

impl GenerateResult {
    /// Concatenated text content, if any.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}
