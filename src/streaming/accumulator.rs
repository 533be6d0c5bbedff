//! Chunk Accumulator
//!
//! Consumes delta chunks one at a time, in arrival order, and produces the
//! unified event sequence: text blocks, tool-input lifecycles, complete tool
//! calls and exactly one terminal `finish` or `error`.

use super::chunk::{DeltaChunk, ToolCallDelta};
use super::tool_call_buffer::ToolCallBuffer;
use crate::error::{Failure, RequestContext, classify};
use crate::types::{
    FinishReason, ProviderMetadata, StreamEvent, UnifiedFinishReason, Usage, Warning,
    map_finish_reason,
};
use std::collections::BTreeMap;

/// Lifecycle of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    /// Nothing emitted beyond `stream-start` yet.
    Idle,
    /// A text block is open.
    TextOpen,
    /// At least one tool-call delta was seen; text is over for this turn.
    ToolAccumulating,
    /// `finish` or `error` was emitted.
    Closed,
}

/// A text block of the current stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub id: String,
    pub open: bool,
}

/// Stream state machine.
#[derive(Debug)]
pub struct ChunkAccumulator {
    state: AccumulatorState,
    include_raw_chunks: bool,
    text_block: Option<TextBlock>,
    tool_calls_seen: bool,
    buffers: BTreeMap<usize, ToolCallBuffer>,
    raw_finish_reason: Option<String>,
    usage: Option<Usage>,
    metadata_emitted: bool,
    chunks_seen: usize,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl ChunkAccumulator {
    pub fn new(include_raw_chunks: bool) -> Self {
        Self {
            state: AccumulatorState::Idle,
            include_raw_chunks,
            text_block: None,
            tool_calls_seen: false,
            buffers: BTreeMap::new(),
            raw_finish_reason: None,
            usage: None,
            metadata_emitted: false,
            chunks_seen: 0,
        }
    }

    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    pub fn text_block(&self) -> Option<&TextBlock> {
        self.text_block.as_ref()
    }

    pub fn buffers(&self) -> impl Iterator<Item = &ToolCallBuffer> {
        self.buffers.values()
    }

    pub fn usage(&self) -> Option<&Usage> {
        self.usage.as_ref()
    }

    pub fn raw_finish_reason(&self) -> Option<&str> {
        self.raw_finish_reason.as_deref()
    }

    /// The `stream-start` event.
    pub fn start(&self, warnings: Vec<Warning>) -> StreamEvent {
        StreamEvent::StreamStart { warnings }
    }

    /// Process the next chunk.
    pub fn push(&mut self, chunk: &dyn DeltaChunk) -> Vec<StreamEvent> {
        if self.state == AccumulatorState::Closed {
            tracing::trace!("chunk received after stream end; ignored");
            return Vec::new();
        }
        self.chunks_seen += 1;

        let mut events = Vec::new();

        if self.include_raw_chunks {
            let raw_value = chunk
                .raw_payload()
                .cloned()
                .unwrap_or_else(|| chunk.to_json());
            events.push(StreamEvent::Raw { raw_value });
        }

        self.emit_response_metadata(chunk, &mut events);

        let tool_deltas: Vec<(usize, ToolCallDelta)> = chunk
            .tool_call_deltas()
            .into_iter()
            .filter_map(|delta| match delta.valid_position() {
                Some(position) => Some((position, delta)),
                None => {
                    tracing::trace!(position = ?delta.position, "dropping tool-call delta without a usable position");
                    None
                }
            })
            .collect();

        if let Some(text) = chunk.delta_text().filter(|t| !t.is_empty()) {
            if tool_deltas.is_empty() && !self.tool_calls_seen {
                self.push_text(text, &mut events);
            }
        }

        for (position, delta) in tool_deltas {
            self.close_text(&mut events);
            self.tool_calls_seen = true;
            self.state = AccumulatorState::ToolAccumulating;
            self.merge_tool_delta(position, &delta, &mut events);
        }

        if let Some(reason) = chunk.finish_reason() {
            self.raw_finish_reason = Some(reason.to_string());
        }
        if let Some(usage) = chunk.usage() {
            self.usage = Some(usage);
        }

        if map_finish_reason(self.raw_finish_reason.as_deref()) == UnifiedFinishReason::ToolCalls
        {
            self.flush_tool_calls(&mut events);
        }

        events
    }

    /// The source ended normally: close what is open and emit `finish`.
    pub fn finish(&mut self, provider_metadata: Option<ProviderMetadata>) -> Vec<StreamEvent> {
        if self.state == AccumulatorState::Closed {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.close_text(&mut events);
        self.flush_tool_calls(&mut events);

        let finish_reason = FinishReason::from_raw(self.raw_finish_reason.as_deref());
        tracing::debug!(
            chunks = self.chunks_seen,
            tool_calls = self.buffers.len(),
            finish_reason = finish_reason.unified.as_str(),
            "stream finished"
        );
        events.push(StreamEvent::Finish {
            finish_reason,
            usage: self.usage.clone().unwrap_or_default(),
            provider_metadata,
        });
        self.state = AccumulatorState::Closed;
        events
    }

    /// The source raised: classify the failure and emit the terminal `error`.
    ///
    /// Events emitted for earlier chunks stay valid; nothing is closed or
    /// flushed.
    pub fn fail(&mut self, failure: Failure, context: Option<&RequestContext>) -> Vec<StreamEvent> {
        if self.state == AccumulatorState::Closed {
            return Vec::new();
        }
        self.state = AccumulatorState::Closed;
        let error = classify(failure, context);
        tracing::warn!(
            chunks = self.chunks_seen,
            kind = ?error.kind(),
            "stream terminated by error: {error}"
        );
        vec![StreamEvent::Error { error }]
    }

    fn emit_response_metadata(&mut self, chunk: &dyn DeltaChunk, events: &mut Vec<StreamEvent>) {
        if self.metadata_emitted {
            return;
        }
        let id = chunk.response_id().map(str::to_string);
        let model_id = chunk.model_id().map(str::to_string);
        let timestamp = chunk.created_at();
        if id.is_none() && model_id.is_none() && timestamp.is_none() {
            return;
        }
        self.metadata_emitted = true;
        events.push(StreamEvent::ResponseMetadata {
            id,
            model_id,
            timestamp,
        });
    }

    fn push_text(&mut self, text: &str, events: &mut Vec<StreamEvent>) {
        let id = match &self.text_block {
            Some(block) if block.open => block.id.clone(),
            _ => {
                let id = new_id();
                events.push(StreamEvent::TextStart { id: id.clone() });
                self.text_block = Some(TextBlock {
                    id: id.clone(),
                    open: true,
                });
                self.state = AccumulatorState::TextOpen;
                id
            }
        };
        events.push(StreamEvent::TextDelta {
            id,
            delta: text.to_string(),
        });
    }

    fn close_text(&mut self, events: &mut Vec<StreamEvent>) {
        if let Some(block) = self.text_block.as_mut().filter(|b| b.open) {
            block.open = false;
            events.push(StreamEvent::TextEnd {
                id: block.id.clone(),
            });
        }
    }

    fn merge_tool_delta(
        &mut self,
        position: usize,
        delta: &ToolCallDelta,
        events: &mut Vec<StreamEvent>,
    ) {
        let buffer = self
            .buffers
            .entry(position)
            .or_insert_with(|| ToolCallBuffer::new(position));
        if buffer.flushed {
            tracing::trace!(position, "tool-call delta after flush; ignored");
            return;
        }
        buffer.merge(delta);

        if buffer.input_id.is_none() && buffer.name.is_some() {
            start_tool_input(buffer, events);
        }
        if buffer.input_id.is_some() {
            report_fragments(buffer, events);
        }
    }

    /// Flush every unflushed buffer in ascending position order.
    fn flush_tool_calls(&mut self, events: &mut Vec<StreamEvent>) {
        for buffer in self.buffers.values_mut().filter(|b| !b.flushed) {
            if buffer.input_id.is_none() {
                start_tool_input(buffer, events);
            }
            report_fragments(buffer, events);
            if let Some(input_id) = &buffer.input_id {
                events.push(StreamEvent::ToolInputEnd {
                    id: input_id.clone(),
                });
            }
            events.push(StreamEvent::ToolCall {
                tool_call_id: buffer.tool_call_id(),
                tool_name: buffer.tool_name(),
                input: buffer.input(),
            });
            buffer.flushed = true;
        }
    }
}

fn start_tool_input(buffer: &mut ToolCallBuffer, events: &mut Vec<StreamEvent>) {
    let input_id = buffer.id.clone().unwrap_or_else(new_id);
    events.push(StreamEvent::ToolInputStart {
        id: input_id.clone(),
        tool_name: buffer.tool_name(),
    });
    buffer.input_id = Some(input_id);
}

fn report_fragments(buffer: &mut ToolCallBuffer, events: &mut Vec<StreamEvent>) {
    let Some(input_id) = buffer.input_id.clone() else {
        return;
    };
    for fragment in &buffer.argument_fragments[buffer.reported_fragments..] {
        if !fragment.is_empty() {
            events.push(StreamEvent::ToolInputDelta {
                id: input_id.clone(),
                delta: fragment.clone(),
            });
        }
    }
    buffer.reported_fragments = buffer.argument_fragments.len();
}
