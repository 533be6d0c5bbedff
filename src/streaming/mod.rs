//! Streaming
//!
//! From vendor delta chunks to the unified [`StreamEvent`](crate::types::StreamEvent)
//! sequence.

pub mod accumulator;
pub mod chunk;
pub mod sse;
pub mod stream;
pub mod tool_call_buffer;

pub use accumulator::{AccumulatorState, ChunkAccumulator, TextBlock};
pub use chunk::{BoxedChunk, DeltaChunk, ToolCallDelta};
pub use sse::decode_sse_chunks;
pub use stream::{AccumulateOptions, ChunkStream, EventStream, accumulate_stream};
pub use tool_call_buffer::ToolCallBuffer;
