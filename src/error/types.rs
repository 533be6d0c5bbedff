//! Classified error types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed set of failure kinds exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    NotFound,
    RateLimit,
    Validation,
    Network,
    Streaming,
    Server,
    Unknown,
}

impl ErrorKind {
    /// Kind implied by an HTTP status alone.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ErrorKind::Authentication,
            404 => ErrorKind::NotFound,
            429 => ErrorKind::RateLimit,
            s if s >= 500 => ErrorKind::Server,
            _ => ErrorKind::Validation,
        }
    }
}

/// Whether a status code is worth retrying: 408, 409, 429 and every 5xx.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 409 | 429) || status >= 500
}

/// Request details attached to a classified error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
}

/// Optional context handed to the classifier.
///
/// Only attached to the result; never used to choose a classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub url: Option<String>,
    pub request_body: Option<String>,
    /// Explicit headers win over headers found on transport metadata.
    pub response_headers: Option<BTreeMap<String, String>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_request_body(mut self, body: impl Into<String>) -> Self {
        self.request_body = Some(body.into());
        self
    }

    pub fn with_response_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.response_headers = Some(headers);
        self
    }

    pub(crate) fn request_info(&self) -> Option<RequestInfo> {
        if self.url.is_none() && self.request_body.is_none() {
            return None;
        }
        Some(RequestInfo {
            url: self.url.clone(),
            request_body: self.request_body.clone(),
        })
    }
}

/// A failure mapped into the closed taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub status_code: u16,
    pub retryable: bool,
    pub message: String,
    /// Model or deployment identifier for [`ErrorKind::NotFound`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestInfo>,
}

impl ClassifiedError {
    pub fn new(
        kind: ErrorKind,
        status_code: u16,
        retryable: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            status_code,
            retryable,
            message: message.into(),
            resource_id: None,
            response_body: None,
            response_headers: None,
            request: None,
        }
    }

    /// Status-driven constructor: kind and retryability follow the status.
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::from_status(status_code),
            status_code,
            is_retryable_status(status_code),
            message,
        )
    }

    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }
}

/// Error returned by every public operation of this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderError {
    /// A failure that went through classification.
    #[error(transparent)]
    Classified(#[from] ClassifiedError),

    /// Credentials could not be loaded before any request was made.
    #[error("API key could not be loaded: {message}")]
    LoadApiKey { message: String },

    /// The requested model is not offered by this provider.
    #[error("No such model: {model_id}")]
    NoSuchModel { model_id: String },
}

impl ProviderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::Classified(e) => e.kind,
            ProviderError::LoadApiKey { .. } => ErrorKind::Authentication,
            ProviderError::NoSuchModel { .. } => ErrorKind::NotFound,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::Classified(e) => Some(e.status_code),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Classified(e) => e.retryable,
            _ => false,
        }
    }

    pub fn as_classified(&self) -> Option<&ClassifiedError> {
        match self {
            ProviderError::Classified(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        for status in [408, 409, 429, 500, 502, 503, 599] {
            assert!(is_retryable_status(status), "{status}");
        }
        for status in [400, 401, 403, 404, 422] {
            assert!(!is_retryable_status(status), "{status}");
        }
    }

    #[test]
    fn kind_from_status() {
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Authentication);
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(429), ErrorKind::RateLimit);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(422), ErrorKind::Validation);
    }

    #[test]
    fn domain_errors_are_not_retryable() {
        let err = ProviderError::NoSuchModel {
            model_id: "gpt-9".into(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!err.is_retryable());
        assert_eq!(err.status_code(), None);
        assert_eq!(err.to_string(), "No such model: gpt-9");
    }
}
