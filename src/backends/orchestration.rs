//! Orchestration-flavored backend payloads
//!
//! The orchestration service wraps the model output: streamed chunks and
//! complete responses both carry the completion under `final_result` (older
//! deployments: `orchestration_result`) next to a service `request_id`.

use super::wire::{CompletionChunk, CompletionResponse};
use crate::error::Failure;
use crate::streaming::{DeltaChunk, ToolCallDelta};
use crate::types::{GenerateResponse, Usage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationChunkBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_results: Option<Value>,
    #[serde(default, alias = "orchestration_result")]
    pub final_result: CompletionChunk,
}

/// One streamed orchestration chunk plus the payload it was decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationChunk {
    pub body: OrchestrationChunkBody,
    pub raw: Value,
}

impl OrchestrationChunk {
    pub fn from_value(raw: Value) -> Result<Self, Failure> {
        let body = serde_json::from_value(raw.clone())?;
        Ok(Self { body, raw })
    }
}

impl DeltaChunk for OrchestrationChunk {
    fn delta_text(&self) -> Option<&str> {
        self.body.final_result.delta_text()
    }

    fn tool_call_deltas(&self) -> Vec<ToolCallDelta> {
        self.body.final_result.tool_call_deltas()
    }

    fn finish_reason(&self) -> Option<&str> {
        self.body.final_result.finish_reason()
    }

    fn usage(&self) -> Option<Usage> {
        self.body.final_result.usage()
    }

    fn raw_payload(&self) -> Option<&Value> {
        Some(&self.raw)
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(&self.body).unwrap_or_default()
    }

    fn response_id(&self) -> Option<&str> {
        self.body
            .final_result
            .id
            .as_deref()
            .or(self.body.request_id.as_deref())
    }

    fn model_id(&self) -> Option<&str> {
        self.body.final_result.model.as_deref()
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.body.final_result.created_at()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OrchestrationResponse {
    #[serde(default, alias = "orchestration_result")]
    final_result: CompletionResponse,
}

/// Decode a complete orchestration response.
pub fn parse_response(
    envelope: Value,
    headers: BTreeMap<String, String>,
) -> Result<GenerateResponse, Failure> {
    let parsed: OrchestrationResponse = serde_json::from_value(envelope.clone())?;
    let result = parsed.final_result;
    Ok(GenerateResponse {
        text: result.text(),
        tool_calls: result.tool_calls(),
        raw_finish_reason: result.finish_reason(),
        usage: result.usage.as_ref().map(|u| u.to_usage()),
        raw_envelope: envelope,
        headers,
    })
}
