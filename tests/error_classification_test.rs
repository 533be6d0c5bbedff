//! Classification of failures coming from the different layers.

use serde_json::json;
use siumai_bridge::error::{
    KEYWORD_RULES, ResponseData, TransportError, TransportResponse, serialize_response_body,
};
use siumai_bridge::prelude::*;

fn classified(error: ProviderError) -> ClassifiedError {
    error.as_classified().cloned().expect("classified error")
}

#[test]
fn already_classified_is_returned_unchanged() {
    let first = classify(
        NativeError::new("Request failed with status code 502").into(),
        None,
    );
    let again = classify(first.clone().into(), None);
    assert_eq!(again, first);
}

#[test]
fn keyword_rules_cover_common_messages() {
    let cases = [
        ("401 Unauthorized: token expired", ErrorKind::Authentication, 401, false),
        ("connect ECONNREFUSED 127.0.0.1:443", ErrorKind::Network, 503, true),
        ("getaddrinfo ENOTFOUND api.example.invalid", ErrorKind::Network, 503, true),
        ("Request timeout after 30000ms", ErrorKind::Network, 503, true),
        ("Content filtered by the input filter", ErrorKind::Validation, 400, false),
        ("Request failed with status code 404", ErrorKind::NotFound, 404, false),
        ("Request failed with status code 408", ErrorKind::Validation, 408, true),
        ("Request failed with status code 400", ErrorKind::Validation, 400, false),
    ];
    for (message, kind, status, retryable) in cases {
        let c = classified(classify(NativeError::new(message).into(), None));
        assert_eq!(c.kind, kind, "{message}");
        assert_eq!(c.status_code, status, "{message}");
        assert_eq!(c.retryable, retryable, "{message}");
        assert_eq!(c.message, message);
    }
}

#[test]
fn keyword_table_is_ordered_data() {
    let names: Vec<&str> = KEYWORD_RULES.iter().map(|r| r.name).collect();
    assert_eq!(names.first(), Some(&"authentication"));
    assert!(names.contains(&"network"));
    let position = |name: &str| names.iter().position(|n| *n == name).unwrap();
    assert!(position("status-code") < position("network"));
}

#[test]
fn envelope_array_uses_first_entry() {
    let c = classified(classify(
        json!({"error": [
            {"code": 400, "message": "Unsupported parameter", "location": "Input Parameters"},
            {"code": 500, "message": "ignored"}
        ]})
        .into(),
        None,
    ));
    assert_eq!(c.status_code, 400);
    assert!(c.message.contains("Unsupported parameter"));
    assert!(c.message.contains("Input Parameters"));
}

#[test]
fn io_errors_map_to_network_failures() {
    let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
    let c = classified(classify(refused.into(), None));
    assert_eq!(c.kind, ErrorKind::Network);
    assert!(c.retryable);
}

#[test]
fn json_errors_are_validation_failures() {
    let err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    let c = classified(classify(err.into(), None));
    assert_eq!(c.kind, ErrorKind::Validation);
    assert_eq!(c.status_code, 400);
    assert!(!c.retryable);
    assert!(c.message.starts_with("Failed to parse JSON"));
}

#[test]
fn transport_metadata_from_wrapped_error() {
    let mut headers = serde_json::Map::new();
    headers.insert("x-request-id".into(), json!("abc-123"));
    headers.insert("x-ratelimit-remaining".into(), json!(0));
    let transport = TransportError {
        status: Some(429),
        response: Some(TransportResponse {
            status: Some(429),
            data: ResponseData::Json(json!({"error": {"message": "slow down"}})),
            headers,
        }),
    };
    let failure = NativeError::new("Streaming request failed").with_cause(
        NativeError::new("Request failed with status code 429").with_transport(transport),
    );
    let context = RequestContext::new()
        .with_url("https://api.example.invalid/v2/completion")
        .with_request_body("{\"stream\":true}");

    let c = classified(classify(failure.into(), Some(&context)));
    assert_eq!(c.kind, ErrorKind::RateLimit);
    assert!(c.retryable);
    assert!(c.message.contains("Error Response:"));
    assert!(c.message.contains("slow down"));
    let headers = c.response_headers.expect("headers");
    assert_eq!(headers["x-request-id"], "abc-123");
    assert_eq!(headers["x-ratelimit-remaining"], "0");
    let request = c.request.expect("request info");
    assert_eq!(request.request_body.as_deref(), Some("{\"stream\":true}"));
}

#[test]
fn oversized_response_body_is_truncated() {
    let body = serialize_response_body(&json!({"detail": "y".repeat(4096)}));
    assert!(body.ends_with("...[truncated]"));
    assert!(body.chars().count() < 4096);
}

#[test]
fn retryability_follows_status() {
    for (status, retryable) in [(408, true), (409, true), (429, true), (500, true), (503, true), (400, false), (404, false)] {
        let c = ClassifiedError::from_status(status, "x");
        assert_eq!(c.retryable, retryable, "{status}");
    }
}
