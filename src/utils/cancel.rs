//! Cancellation utilities
//!
//! Abort signals are plain [`CancellationToken`]s. Backends forward them to
//! their transport; [`abortable`] covers chunk sources that cannot observe the
//! token themselves.

use crate::error::{Failure, NativeError};
use crate::streaming::ChunkStream;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

/// Message of the failure raised when a chunk source is aborted.
pub const ABORT_MESSAGE: &str = "The operation was aborted";

/// Failure value raised by an aborted chunk source.
pub fn abort_failure() -> Failure {
    NativeError::new(ABORT_MESSAGE)
        .with_name("AbortError")
        .into()
}

/// End `stream` with an abort failure once `token` is cancelled.
///
/// Dropping the inner stream releases the underlying connection; whether the
/// remote side stops generating is up to the server.
pub fn abortable(stream: ChunkStream, token: CancellationToken) -> ChunkStream {
    let out = async_stream::stream! {
        let mut inner = stream;
        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                item = inner.next() => Some(item),
            };
            match next {
                Some(Some(item)) => {
                    yield item;
                }
                Some(None) => break,
                None => {
                    tracing::debug!("chunk source aborted");
                    yield Err(abort_failure());
                    break;
                }
            }
        }
    };
    Box::pin(out)
}
