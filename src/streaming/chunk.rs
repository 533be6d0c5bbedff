//! Delta chunk abstraction
//!
//! Both backend flavors stream small vendor-specific chunks. The accumulator
//! only sees them through [`DeltaChunk`].

use crate::types::Usage;
use serde_json::Value;

/// One partial tool-call entry of a delta chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCallDelta {
    /// Position of the tool call within the assistant turn, as the vendor sent
    /// it. Entries without a finite non-negative integer position are dropped.
    pub position: Option<f64>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub arguments: Option<String>,
}

impl ToolCallDelta {
    pub fn at(position: usize) -> Self {
        Self {
            position: Some(position as f64),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }

    /// The buffer index this entry addresses, if its position is usable.
    pub fn valid_position(&self) -> Option<usize> {
        let p = self.position?;
        if p.is_finite() && p >= 0.0 && p.fract() == 0.0 && p <= usize::MAX as f64 {
            Some(p as usize)
        } else {
            None
        }
    }

    /// Read a position out of a JSON `index` field.
    pub fn position_from_json(value: Option<&Value>) -> Option<f64> {
        value.and_then(Value::as_f64)
    }
}

/// Accessors the accumulator needs from a streamed chunk.
pub trait DeltaChunk: std::fmt::Debug {
    /// Text delta of the first choice.
    fn delta_text(&self) -> Option<&str>;

    /// Tool-call entries of the first choice, in the vendor's order.
    fn tool_call_deltas(&self) -> Vec<ToolCallDelta>;

    /// Finish reason, `None` on non-terminal chunks.
    fn finish_reason(&self) -> Option<&str>;

    /// Usage carried by this chunk, if any.
    fn usage(&self) -> Option<Usage>;

    /// The vendor payload this chunk was decoded from.
    fn raw_payload(&self) -> Option<&Value> {
        None
    }

    /// JSON rendition of the chunk itself.
    fn to_json(&self) -> Value;

    fn response_id(&self) -> Option<&str> {
        None
    }

    fn model_id(&self) -> Option<&str> {
        None
    }

    fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        None
    }
}

/// Boxed chunk as produced by a backend stream.
pub type BoxedChunk = Box<dyn DeltaChunk + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_positions() {
        assert_eq!(ToolCallDelta::at(0).valid_position(), Some(0));
        assert_eq!(ToolCallDelta::at(7).valid_position(), Some(7));
    }

    #[test]
    fn invalid_positions() {
        for p in [None, Some(f64::NAN), Some(-1.0), Some(1.5), Some(f64::INFINITY)] {
            let delta = ToolCallDelta {
                position: p,
                ..Default::default()
            };
            assert_eq!(delta.valid_position(), None, "{p:?}");
        }
    }

    #[test]
    fn position_from_json_only_accepts_numbers() {
        assert_eq!(ToolCallDelta::position_from_json(Some(&json!(2))), Some(2.0));
        assert_eq!(ToolCallDelta::position_from_json(Some(&json!("2"))), None);
        assert_eq!(ToolCallDelta::position_from_json(None), None);
    }
}
