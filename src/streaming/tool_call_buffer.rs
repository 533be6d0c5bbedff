//! Per-position tool call accumulation

use super::chunk::ToolCallDelta;

/// Collects one tool invocation's identity and argument text across chunks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCallBuffer {
    pub position: usize,
    pub id: Option<String>,
    pub name: Option<String>,
    pub argument_fragments: Vec<String>,
    pub flushed: bool,
    /// Identifier of the tool-input lifecycle once `tool-input-start` went out.
    pub(crate) input_id: Option<String>,
    /// Fragments already reported through `tool-input-delta`.
    pub(crate) reported_fragments: usize,
}

impl ToolCallBuffer {
    pub fn new(position: usize) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Merge a delta into the buffer.
    ///
    /// `id` and `name` are set once and never overwritten; argument fragments
    /// are appended verbatim in arrival order.
    pub fn merge(&mut self, delta: &ToolCallDelta) {
        if self.id.is_none() {
            if let Some(id) = delta.id.as_deref().filter(|s| !s.is_empty()) {
                self.id = Some(id.to_string());
            }
        }
        if self.name.is_none() {
            if let Some(name) = delta.name.as_deref().filter(|s| !s.is_empty()) {
                self.name = Some(name.to_string());
            }
        }
        if let Some(fragment) = &delta.arguments {
            self.argument_fragments.push(fragment.clone());
        }
    }

    /// Full argument text.
    pub fn input(&self) -> String {
        self.argument_fragments.concat()
    }

    /// Tool call id, empty when the vendor never sent one.
    pub fn tool_call_id(&self) -> String {
        self.id.clone().unwrap_or_default()
    }

    /// Tool name, empty when the vendor never sent one.
    pub fn tool_name(&self) -> String {
        self.name.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_set_once() {
        let mut buffer = ToolCallBuffer::new(0);
        buffer.merge(&ToolCallDelta::at(0).with_arguments("{\"a\""));
        buffer.merge(&ToolCallDelta::at(0).with_id("call_1"));
        buffer.merge(&ToolCallDelta::at(0).with_name("lookup").with_arguments(":1}"));
        buffer.merge(&ToolCallDelta::at(0).with_id("call_2").with_name("other"));
        buffer.merge(&ToolCallDelta {
            position: Some(0.0),
            id: Some(String::new()),
            ..Default::default()
        });

        assert_eq!(buffer.tool_call_id(), "call_1");
        assert_eq!(buffer.tool_name(), "lookup");
        assert_eq!(buffer.input(), "{\"a\":1}");
    }

    #[test]
    fn missing_identity_falls_back_to_empty() {
        let buffer = ToolCallBuffer::new(3);
        assert_eq!(buffer.tool_call_id(), "");
        assert_eq!(buffer.tool_name(), "");
        assert_eq!(buffer.input(), "");
    }
}
