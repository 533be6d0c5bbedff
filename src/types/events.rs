//! Unified stream events

use crate::error::ProviderError;
use crate::types::{FinishReason, Usage};
use serde::{Deserialize, Serialize};

/// Provider metadata keyed by provider name.
pub type ProviderMetadata = serde_json::Map<String, serde_json::Value>;

/// Non-fatal notice produced while preparing a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Warning {
    Unsupported {
        feature: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
    Compatibility {
        feature: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
    Other {
        message: String,
    },
}

/// One event of a unified response stream.
///
/// Exactly one [`StreamEvent::Finish`] or [`StreamEvent::Error`] ends a
/// stream; nothing follows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamEvent {
    StreamStart {
        warnings: Vec<Warning>,
    },
    TextStart {
        id: String,
    },
    TextDelta {
        id: String,
        delta: String,
    },
    TextEnd {
        id: String,
    },
    ToolInputStart {
        id: String,
        #[serde(rename = "toolName")]
        tool_name: String,
    },
    ToolInputDelta {
        id: String,
        delta: String,
    },
    ToolInputEnd {
        id: String,
    },
    ToolCall {
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        #[serde(rename = "toolName")]
        tool_name: String,
        /// Stringified JSON arguments, exactly as concatenated from the stream.
        input: String,
    },
    ResponseMetadata {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", rename = "modelId")]
        model_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<chrono::DateTime<chrono::Utc>>,
    },
    Raw {
        #[serde(rename = "rawValue")]
        raw_value: serde_json::Value,
    },
    Finish {
        #[serde(rename = "finishReason")]
        finish_reason: FinishReason,
        usage: Usage,
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            rename = "providerMetadata"
        )]
        provider_metadata: Option<ProviderMetadata>,
    },
    Error {
        error: ProviderError,
    },
}

impl StreamEvent {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Finish { .. } | StreamEvent::Error { .. })
    }

    /// Wire name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::StreamStart { .. } => "stream-start",
            StreamEvent::TextStart { .. } => "text-start",
            StreamEvent::TextDelta { .. } => "text-delta",
            StreamEvent::TextEnd { .. } => "text-end",
            StreamEvent::ToolInputStart { .. } => "tool-input-start",
            StreamEvent::ToolInputDelta { .. } => "tool-input-delta",
            StreamEvent::ToolInputEnd { .. } => "tool-input-end",
            StreamEvent::ToolCall { .. } => "tool-call",
            StreamEvent::ResponseMetadata { .. } => "response-metadata",
            StreamEvent::Raw { .. } => "raw",
            StreamEvent::Finish { .. } => "finish",
            StreamEvent::Error { .. } => "error",
        }
    }
}
