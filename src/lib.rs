//! # siumai-bridge
//!
//! A unified event and error model over two heterogeneous chat-completion
//! backends: an orchestration-flavored API and a direct-model API.
#![deny(unsafe_code)]

//! ## What lives here
//!
//! - **Streaming accumulation**: vendor delta chunks become well-formed text
//!   blocks and complete tool calls (`streaming`).
//! - **Error classification**: any failure value becomes one
//!   [`ClassifiedError`] with retryability and diagnostics (`error`).
//! - **Backend bindings**: a clearable, injectable cache that resolves the
//!   backend adapter for an API flavor exactly once (`registry`).
//! - **Model facade**: `do_generate` / `do_stream` wiring it all together
//!   (`model`).
//!
//! ## Quick look
//!
//! ```rust,ignore
//! use siumai_bridge::prelude::*;
//! use futures_util::StreamExt;
//!
//! let bindings = Arc::new(BindingCache::new(my_loader));
//! let model = BridgeChatModel::new("gpt-4o", ProviderSettings::default(), bindings);
//!
//! let mut events = model.do_stream(&request, StreamOptions::default()).await?;
//! while let Some(event) = events.next().await {
//!     match event {
//!         StreamEvent::TextDelta { delta, .. } => print!("{delta}"),
//!         StreamEvent::ToolCall { tool_name, input, .. } => println!("{tool_name}({input})"),
//!         StreamEvent::Error { error } => eprintln!("{error}"),
//!         _ => {}
//!     }
//! }
//! ```

pub mod backends;
pub mod config;
pub mod defaults;
pub mod error;
pub mod model;
pub mod observability;
pub mod registry;
pub mod streaming;
pub mod types;
pub mod utils;

pub use error::{ClassifiedError, ErrorKind, Failure, ProviderError, classify};
pub use model::BridgeChatModel;
pub use types::{ApiFlavor, FinishReason, StreamEvent, UnifiedFinishReason, Usage};

/// Commonly used items.
pub mod prelude {
    pub use crate::backends::{Backend, ChunkStream};
    pub use crate::config::{GenerateOptions, ProviderSettings, StreamOptions};
    pub use crate::error::{
        ClassifiedError, ErrorKind, Failure, NativeError, ProviderError, RequestContext, classify,
    };
    pub use crate::model::BridgeChatModel;
    pub use crate::registry::{BackendLoader, BindingCache, BindingStore, InMemoryBindingStore};
    pub use crate::streaming::{DeltaChunk, EventStream, ToolCallDelta};
    pub use crate::types::*;
    pub use std::sync::Arc;
}
