//! Finish reason normalization

use serde::{Deserialize, Serialize};

/// Provider-agnostic finish reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnifiedFinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    Error,
    Other,
}

impl UnifiedFinishReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ContentFilter => "content-filter",
            Self::ToolCalls => "tool-calls",
            Self::Error => "error",
            Self::Other => "other",
        }
    }
}

/// Finish reason as reported to callers: the normalized value plus the
/// vendor token it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishReason {
    pub unified: UnifiedFinishReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl FinishReason {
    /// Normalize a raw vendor token. Matching is case-sensitive.
    pub fn from_raw(raw: Option<&str>) -> Self {
        Self {
            unified: map_finish_reason(raw),
            raw: raw.map(str::to_string),
        }
    }
}

impl Default for FinishReason {
    fn default() -> Self {
        Self::from_raw(None)
    }
}

/// Map a vendor finish-reason token to the unified enum.
pub fn map_finish_reason(raw: Option<&str>) -> UnifiedFinishReason {
    match raw {
        Some("stop" | "eos" | "stop_sequence" | "end_turn") => UnifiedFinishReason::Stop,
        Some("length" | "max_tokens" | "max_tokens_reached") => UnifiedFinishReason::Length,
        Some("content_filter") => UnifiedFinishReason::ContentFilter,
        Some("tool_call" | "tool_calls" | "function_call") => UnifiedFinishReason::ToolCalls,
        Some("error") => UnifiedFinishReason::Error,
        _ => UnifiedFinishReason::Other,
    }
}
