//! Classifier input: anything that can go wrong

use crate::defaults::errors::MAX_CAUSE_DEPTH;
use crate::error::ProviderError;

/// Any failure value, before classification.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// Already classified, or one of the domain errors. Passed through as is.
    Provider(ProviderError),
    /// An error object with a message, an optional cause and optional
    /// transport metadata.
    Error(NativeError),
    /// A bare value: a vendor error envelope, a string, a number, `null`...
    Value(serde_json::Value),
    /// Nothing at all.
    Undefined,
}

/// An error object as raised by a transport or SDK layer.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeError {
    pub name: String,
    pub message: String,
    /// Root-cause link.
    pub cause: Option<Box<Failure>>,
    /// Present when the error was raised by an HTTP client.
    pub transport: Option<TransportError>,
}

/// HTTP client metadata attached to a native error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportError {
    pub status: Option<u16>,
    pub response: Option<TransportResponse>,
}

/// The response an HTTP client saw before failing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportResponse {
    pub status: Option<u16>,
    pub data: ResponseData,
    /// Header values as the client exposed them (strings, arrays, numbers...).
    pub headers: serde_json::Map<String, serde_json::Value>,
}

/// Response body of a failed HTTP call.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseData {
    #[default]
    Empty,
    Text(String),
    Json(serde_json::Value),
    Binary(bytes::Bytes),
}

impl NativeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: "Error".to_string(),
            message: message.into(),
            cause: None,
            transport: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_cause(mut self, cause: impl Into<Failure>) -> Self {
        self.cause = Some(Box::new(cause.into()));
        self
    }

    pub fn with_transport(mut self, transport: TransportError) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl TransportError {
    pub fn with_response(status: u16, data: ResponseData) -> Self {
        Self {
            status: Some(status),
            response: Some(TransportResponse {
                status: Some(status),
                data,
                headers: serde_json::Map::new(),
            }),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.response
            .get_or_insert_with(TransportResponse::default)
            .headers
            .insert(name.into(), value);
        self
    }
}

impl Failure {
    /// Build a failure from a plain message.
    pub fn message(message: impl Into<String>) -> Self {
        Failure::Error(NativeError::new(message))
    }

    /// Follow root-cause links to the innermost failure.
    ///
    /// Stops after [`MAX_CAUSE_DEPTH`] hops and returns the last failure
    /// reached.
    pub fn root_cause(&self) -> &Failure {
        let mut current = self;
        for _ in 0..MAX_CAUSE_DEPTH {
            match current {
                Failure::Error(NativeError {
                    cause: Some(cause), ..
                }) => current = cause.as_ref(),
                _ => break,
            }
        }
        current
    }

    /// Transport metadata carried directly by this failure.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            Failure::Error(e) => e.transport.as_ref(),
            _ => None,
        }
    }

    pub fn as_native(&self) -> Option<&NativeError> {
        match self {
            Failure::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NativeError> for Failure {
    fn from(err: NativeError) -> Self {
        Failure::Error(err)
    }
}

impl From<ProviderError> for Failure {
    fn from(err: ProviderError) -> Self {
        Failure::Provider(err)
    }
}

impl From<crate::error::ClassifiedError> for Failure {
    fn from(err: crate::error::ClassifiedError) -> Self {
        Failure::Provider(ProviderError::Classified(err))
    }
}

impl From<serde_json::Value> for Failure {
    fn from(value: serde_json::Value) -> Self {
        Failure::Value(value)
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Failure::Value(serde_json::Value::String(message.to_string()))
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::Value(serde_json::Value::String(message))
    }
}
