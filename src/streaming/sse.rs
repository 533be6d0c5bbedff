//! SSE chunk decoding
//!
//! Turns a server-sent-event byte stream into typed delta chunks of one
//! backend flavor. Servers report failures in-band, so a `data:` payload that
//! is an error envelope ends the stream with a failure whose message embeds
//! the payload; the classifier recovers the envelope from that text.

use super::stream::ChunkStream;
use crate::backends::decode_chunk;
use crate::error::{Failure, NativeError, match_envelope};
use crate::types::ApiFlavor;
use eventsource_stream::{EventStreamError, Eventsource};
use futures_util::{Stream, StreamExt};

/// `data:` payload that marks the end of the stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Decode an SSE byte stream into chunks of `flavor`.
pub fn decode_sse_chunks<S, B, E>(byte_stream: S, flavor: ApiFlavor) -> ChunkStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<Failure> + std::fmt::Display + Send + 'static,
{
    let out = async_stream::stream! {
        let mut events = Box::pin(byte_stream.eventsource());

        while let Some(item) = events.next().await {
            let event = match item {
                Ok(event) => event,
                Err(EventStreamError::Transport(err)) => {
                    yield Err(err.into());
                    return;
                }
                Err(err) => {
                    yield Err(Failure::from(
                        NativeError::new(format!("Streaming failed: {err}")).with_name("SseError"),
                    ));
                    return;
                }
            };

            let data = event.data.trim();
            if data.is_empty() || data == DONE_MARKER {
                continue;
            }

            let payload: serde_json::Value = match serde_json::from_str(data) {
                Ok(payload) => payload,
                Err(_) => {
                    yield Err(Failure::from(
                        NativeError::new(format!("Could not parse message into JSON: {data}"))
                            .with_name("SyntaxError"),
                    ));
                    return;
                }
            };

            if match_envelope(&payload).is_some() {
                yield Err(Failure::from(NativeError::new(format!(
                    "Error received from the server.\n{data}"
                ))));
                return;
            }

            yield decode_chunk(flavor, payload);
        }
    };

    Box::pin(out)
}
