//! Vendor error envelope recognition
//!
//! Backends report failures as `{"error": {"message": ..., "code": ...}}`,
//! sometimes as `{"error": [ ... ]}`, and sometimes embed that JSON inside
//! the text of another error.

use serde_json::Value;

/// Fields extracted from a vendor error envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEnvelope {
    pub message: String,
    pub code: Option<f64>,
    pub location: Option<String>,
    pub request_id: Option<String>,
}

impl ErrorEnvelope {
    /// HTTP status implied by the envelope: `code` when it is a finite number
    /// in `[100, 600)`, otherwise 500.
    pub fn status_code(&self) -> u16 {
        match self.code {
            Some(code) if code.is_finite() && (100.0..600.0).contains(&code) => code as u16,
            _ => 500,
        }
    }
}

/// Match `{error: {message, code?, location?, request_id?}}` or
/// `{error: [ ... ]}` (first entry wins).
pub fn match_envelope(value: &Value) -> Option<ErrorEnvelope> {
    let error = value.as_object()?.get("error")?;
    let inner = match error {
        Value::Array(entries) => entries.first()?,
        other => other,
    };
    envelope_body(inner)
}

fn envelope_body(inner: &Value) -> Option<ErrorEnvelope> {
    let obj = inner.as_object()?;
    let message = obj.get("message")?.as_str()?.to_string();
    Some(ErrorEnvelope {
        message,
        code: obj.get("code").and_then(Value::as_f64),
        location: obj
            .get("location")
            .and_then(Value::as_str)
            .map(str::to_string),
        request_id: obj
            .get("request_id")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Find a `{...}` span in free text and parse it as an envelope.
///
/// A parsed object that is itself an envelope body (`{message, ...}` without
/// the `error` wrapper) is accepted as if it were wrapped.
pub(crate) fn embedded_envelope(text: &str) -> Option<ErrorEnvelope> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    let parsed: Value = serde_json::from_str(&text[start..=end]).ok()?;
    match_envelope(&parsed).or_else(|| envelope_body(&parsed))
}
