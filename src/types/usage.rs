//! Token usage

use serde::{Deserialize, Serialize};

/// Token usage for one response.
///
/// Streams record usage last-write-wins: every chunk that carries usage
/// replaces what was recorded before; values are never summed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub input_tokens: InputTokens,
    pub output_tokens: OutputTokens,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputTokens {
    pub total: Option<u64>,
    pub cache_read: Option<u64>,
    pub cache_write: Option<u64>,
    pub no_cache: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputTokens {
    pub total: Option<u64>,
    pub reasoning: Option<u64>,
    pub text: Option<u64>,
}

impl Usage {
    /// Build usage from OpenAI-style counters.
    ///
    /// `cached` is the part of the prompt served from cache and `reasoning`
    /// the part of the completion spent on reasoning; the remaining buckets
    /// are derived from them.
    pub fn from_counts(
        prompt: Option<u64>,
        completion: Option<u64>,
        cached: Option<u64>,
        reasoning: Option<u64>,
    ) -> Self {
        let no_cache = match (prompt, cached) {
            (Some(p), Some(c)) => Some(p.saturating_sub(c)),
            (Some(p), None) => Some(p),
            _ => None,
        };
        let text = match (completion, reasoning) {
            (Some(c), Some(r)) => Some(c.saturating_sub(r)),
            (Some(c), None) => Some(c),
            _ => None,
        };
        Self {
            input_tokens: InputTokens {
                total: prompt,
                cache_read: cached,
                cache_write: None,
                no_cache,
            },
            output_tokens: OutputTokens {
                total: completion,
                reasoning,
                text,
            },
        }
    }
}
