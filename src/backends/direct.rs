//! Direct-model backend payloads
//!
//! The direct-model API returns plain chat-completion chunks and responses.

use super::wire::{CompletionChunk, CompletionResponse};
use crate::error::Failure;
use crate::streaming::{DeltaChunk, ToolCallDelta};
use crate::types::{GenerateResponse, Usage};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// One streamed direct-model chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectModelChunk(pub CompletionChunk);

impl DirectModelChunk {
    pub fn from_value(raw: Value) -> Result<Self, Failure> {
        Ok(Self(serde_json::from_value(raw)?))
    }
}

impl DeltaChunk for DirectModelChunk {
    fn delta_text(&self) -> Option<&str> {
        self.0.delta_text()
    }

    fn tool_call_deltas(&self) -> Vec<ToolCallDelta> {
        self.0.tool_call_deltas()
    }

    fn finish_reason(&self) -> Option<&str> {
        self.0.finish_reason()
    }

    fn usage(&self) -> Option<Usage> {
        self.0.usage()
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or_default()
    }

    fn response_id(&self) -> Option<&str> {
        self.0.id.as_deref()
    }

    fn model_id(&self) -> Option<&str> {
        self.0.model.as_deref()
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.0.created_at()
    }
}

/// Decode a complete direct-model response.
pub fn parse_response(
    envelope: Value,
    headers: BTreeMap<String, String>,
) -> Result<GenerateResponse, Failure> {
    let response: CompletionResponse = serde_json::from_value(envelope.clone())?;
    Ok(GenerateResponse {
        text: response.text(),
        tool_calls: response.tool_calls(),
        raw_finish_reason: response.finish_reason(),
        usage: response.usage.as_ref().map(|u| u.to_usage()),
        raw_envelope: envelope,
        headers,
    })
}
