//! Backend adapters
//!
//! A backend is the concrete binding that serves one [`ApiFlavor`]: it turns a
//! [`ChatRequest`] into either one complete response or a stream of delta
//! chunks. HTTP transport is the backend's business; this module only fixes
//! the contract and the payload shapes of both flavors.

pub mod direct;
pub mod orchestration;
pub mod wire;

pub use direct::DirectModelChunk;
pub use orchestration::OrchestrationChunk;
pub use crate::streaming::ChunkStream;

use crate::error::Failure;
use crate::streaming::BoxedChunk;
use crate::types::{ApiFlavor, ChatRequest, GenerateResponse, Warning};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// The generate/stream contract every flavor implements.
#[async_trait]
pub trait Backend: Send + Sync {
    fn flavor(&self) -> ApiFlavor;

    /// Endpoint the backend talks to, used for error context.
    fn endpoint(&self) -> Option<String> {
        None
    }

    /// Warnings about request settings this backend ignores or adapts.
    fn warnings(&self, _request: &ChatRequest) -> Vec<Warning> {
        Vec::new()
    }

    /// One complete response.
    async fn generate(&self, request: &ChatRequest) -> Result<GenerateResponse, Failure>;

    /// Start a streaming call.
    ///
    /// `abort` must be forwarded to the transport; once it fires the returned
    /// stream is expected to end or yield an error.
    async fn stream(
        &self,
        request: &ChatRequest,
        abort: CancellationToken,
    ) -> Result<ChunkStream, Failure>;
}

/// Decode one streamed payload of the given flavor.
pub fn decode_chunk(flavor: ApiFlavor, payload: Value) -> Result<BoxedChunk, Failure> {
    let chunk: BoxedChunk = match flavor {
        ApiFlavor::Orchestration => Box::new(OrchestrationChunk::from_value(payload)?),
        ApiFlavor::DirectModel => Box::new(DirectModelChunk::from_value(payload)?),
    };
    Ok(chunk)
}

/// Decode a complete response envelope of the given flavor.
pub fn parse_generate_response(
    flavor: ApiFlavor,
    envelope: Value,
    headers: BTreeMap<String, String>,
) -> Result<GenerateResponse, Failure> {
    match flavor {
        ApiFlavor::Orchestration => orchestration::parse_response(envelope, headers),
        ApiFlavor::DirectModel => direct::parse_response(envelope, headers),
    }
}
