//! Type Conversions into `Failure`
//!
//! From trait implementations for common error types. Messages are shaped so
//! the keyword table recognizes them (network codes, JSON parse failures,
//! status codes).

use super::failure::{Failure, NativeError};
use crate::defaults::errors::MAX_CAUSE_DEPTH;

impl Failure {
    /// Capture a `std::error::Error` and its `source()` chain as nested
    /// native errors. At most [`MAX_CAUSE_DEPTH`] links are kept.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut messages = Vec::new();
        let mut current = Some(err);
        while let Some(e) = current {
            if messages.len() >= MAX_CAUSE_DEPTH {
                break;
            }
            messages.push(e.to_string());
            current = e.source();
        }

        let mut failure: Option<Failure> = None;
        for message in messages.into_iter().rev() {
            let mut native = NativeError::new(message);
            if let Some(inner) = failure.take() {
                native = native.with_cause(inner);
            }
            failure = Some(Failure::Error(native));
        }
        failure.unwrap_or(Failure::Undefined)
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Failure::Error(
            NativeError::new(format!("Failed to parse JSON: {err}")).with_name("SyntaxError"),
        )
    }
}

impl From<std::io::Error> for Failure {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        let message = match err.kind() {
            ErrorKind::ConnectionRefused => format!("connect ECONNREFUSED: {err}"),
            ErrorKind::TimedOut => format!("Connection timeout: {err}"),
            ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => {
                format!("Network connection lost: {err}")
            }
            _ if err.to_string().contains("failed to lookup address") => {
                format!("getaddrinfo ENOTFOUND: {err}")
            }
            _ => err.to_string(),
        };
        Failure::Error(NativeError::new(message).with_name("IoError"))
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for Failure {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let message = if err.is_timeout() {
            format!("Request timeout: {err}")
        } else if err.is_connect() {
            format!("Network connection failed: {err}")
        } else if let Some(code) = status {
            format!("Request failed with status code {code}: {err}")
        } else {
            err.to_string()
        };
        let mut native = NativeError::new(message).with_name("HttpError");
        if let Some(code) = status {
            native = native.with_transport(super::failure::TransportError {
                status: Some(code),
                response: None,
            });
        }
        Failure::Error(native)
    }
}
