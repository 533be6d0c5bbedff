//! Error Handling Module
//!
//! Every failure that reaches a caller goes through [`classify`] exactly once
//! and comes out as a [`ProviderError`]:
//! - [`Failure`] describes any thrown value (native errors with cause chains
//!   and transport metadata, vendor JSON envelopes, plain strings, nothing)
//! - [`ClassifiedError`] is the closed taxonomy with retryability and
//!   diagnostics
//! - already-classified values and the domain errors pass through unchanged
//!
//! # Example
//!
//! ```rust,ignore
//! use siumai_bridge::error::{classify, ErrorKind, Failure, NativeError};
//!
//! let err = classify(NativeError::new("Request failed with status code 429.").into(), None);
//! assert_eq!(err.status_code(), Some(429));
//! assert!(err.is_retryable());
//! ```

mod classifier;
mod conversions;
mod envelope;
mod failure;
mod rules;
mod transport;
pub mod types;

pub use classifier::*;
pub use envelope::{ErrorEnvelope, match_envelope};
pub use failure::*;
pub use rules::{KEYWORD_RULES, KeywordRule, Matcher, RuleOutcome};
pub use transport::{normalize_headers, serialize_response_body};
pub use types::*;
