//! Transport metadata helpers: response body serialization and header
//! normalization for classified errors.

use super::failure::ResponseData;
use crate::defaults::errors::{RESPONSE_BODY_MAX_CHARS, TRUNCATION_MARKER};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Serialize a response payload for inclusion in an error message.
///
/// Output longer than [`RESPONSE_BODY_MAX_CHARS`] characters is cut and
/// suffixed with [`TRUNCATION_MARKER`]. A payload that cannot be serialized
/// yields `"[Unable to serialize: <type>]"` instead of an error.
pub fn serialize_response_body<T: Serialize + ?Sized>(data: &T) -> String {
    match serde_json::to_string(data) {
        Ok(text) => truncate_body(text),
        Err(_) => format!("[Unable to serialize: {}]", std::any::type_name::<T>()),
    }
}

fn truncate_body(text: String) -> String {
    match text.char_indices().nth(RESPONSE_BODY_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text,
    }
}

/// Body text for a transport response, `None` when there is no body.
pub(crate) fn response_data_body(data: &ResponseData) -> Option<String> {
    match data {
        ResponseData::Empty | ResponseData::Json(Value::Null) => None,
        ResponseData::Text(text) => Some(text.clone()),
        ResponseData::Json(value) => Some(serialize_response_body(value)),
        ResponseData::Binary(bytes) => Some(match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => "[Unable to serialize: bytes]".to_string(),
        }),
    }
}

/// Normalize raw header values into plain strings.
///
/// Strings pass through, arrays keep their string entries joined with `"; "`
/// (dropped entirely when none remain), numbers and booleans are stringified,
/// anything else is dropped.
pub fn normalize_headers(raw: &serde_json::Map<String, Value>) -> BTreeMap<String, String> {
    raw.iter()
        .filter_map(|(name, value)| {
            let normalized = match value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                Value::Array(items) => {
                    let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                    (!parts.is_empty()).then(|| parts.join("; "))
                }
                Value::Null | Value::Object(_) => None,
            };
            normalized.map(|v| (name.clone(), v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn truncates_long_payloads() {
        let payload = json!({ "detail": "x".repeat(5000) });
        let body = serialize_response_body(&payload);
        assert!(body.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            body.chars().count(),
            RESPONSE_BODY_MAX_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn short_payloads_are_untouched() {
        let body = serialize_response_body(&json!({"a": 1}));
        assert_eq!(body, r#"{"a":1}"#);
    }

    #[test]
    fn unserializable_payload_gets_placeholder() {
        // Maps with non-string keys cannot be represented as JSON.
        let mut payload = HashMap::new();
        payload.insert((1, 2), "edge");
        let body = serialize_response_body(&payload);
        assert!(body.starts_with("[Unable to serialize: "));
        assert!(body.contains("HashMap"));
    }

    #[test]
    fn response_data_variants() {
        assert_eq!(response_data_body(&ResponseData::Empty), None);
        assert_eq!(
            response_data_body(&ResponseData::Text("plain".into())).as_deref(),
            Some("plain")
        );
        assert_eq!(
            response_data_body(&ResponseData::Binary(bytes::Bytes::from_static(&[0xff, 0xfe])))
                .as_deref(),
            Some("[Unable to serialize: bytes]")
        );
    }

    #[test]
    fn normalizes_header_values() {
        let raw = json!({
            "content-type": "application/json",
            "set-cookie": ["a=1", 2, "b=2"],
            "x-empty": [1, 2],
            "x-retry-after": 30,
            "x-flag": true,
            "x-object": {"nested": "dropped"}
        });
        let headers = normalize_headers(raw.as_object().unwrap());
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["set-cookie"], "a=1; b=2");
        assert_eq!(headers["x-retry-after"], "30");
        assert_eq!(headers["x-flag"], "true");
        assert!(!headers.contains_key("x-empty"));
        assert!(!headers.contains_key("x-object"));
    }
}
