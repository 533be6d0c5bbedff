//! Async event stream over a chunk source

use super::accumulator::ChunkAccumulator;
use super::chunk::BoxedChunk;
use crate::error::{Failure, RequestContext};
use crate::types::{ProviderMetadata, StreamEvent, Warning};
use futures_util::{Stream, StreamExt};
use std::pin::Pin;

/// Ordered delta chunks as produced by a backend. An `Err` item ends the
/// source.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<BoxedChunk, Failure>> + Send>>;

/// Unified events handed to the caller. Finite, terminated by exactly one
/// `finish` or `error`.
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Inputs that shape the event stream besides the chunks themselves.
#[derive(Debug, Clone, Default)]
pub struct AccumulateOptions {
    pub include_raw_chunks: bool,
    /// Carried by `stream-start`.
    pub warnings: Vec<Warning>,
    /// Carried by `finish`.
    pub provider_metadata: Option<ProviderMetadata>,
    /// Attached to a classified mid-stream failure.
    pub context: Option<RequestContext>,
}

/// Drive a [`ChunkAccumulator`] over `source`.
///
/// Work only happens when the caller polls; a failing source becomes a single
/// terminal `error` event instead of a failed stream.
pub fn accumulate_stream(source: ChunkStream, options: AccumulateOptions) -> EventStream {
    let AccumulateOptions {
        include_raw_chunks,
        warnings,
        provider_metadata,
        context,
    } = options;

    let out = async_stream::stream! {
        let mut source = source;
        let mut accumulator = ChunkAccumulator::new(include_raw_chunks);
        yield accumulator.start(warnings);

        while let Some(item) = source.next().await {
            match item {
                Ok(chunk) => {
                    tracing::trace!(?chunk, "processing chunk");
                    for event in accumulator.push(&*chunk) {
                        yield event;
                    }
                }
                Err(failure) => {
                    for event in accumulator.fail(failure, context.as_ref()) {
                        yield event;
                    }
                    return;
                }
            }
        }

        for event in accumulator.finish(provider_metadata) {
            yield event;
        }
    };

    Box::pin(out)
}
