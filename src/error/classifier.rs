//! Failure classification
//!
//! Maps any [`Failure`] onto one [`ProviderError`]:
//! 1. already-classified values and domain errors pass through unchanged
//! 2. cause links are followed to the root failure (bounded)
//! 3. vendor envelopes, structured or embedded in error text, are decoded
//! 4. otherwise the keyword table decides
//!
//! Transport metadata (response body and headers) and the optional request
//! context are attached afterwards; they never change the classification.

use super::envelope::{ErrorEnvelope, embedded_envelope, match_envelope};
use super::failure::{Failure, TransportError};
use super::rules::{RuleOutcome, match_rules};
use super::transport::{normalize_headers, response_data_body};
use super::types::{ClassifiedError, ErrorKind, ProviderError, RequestContext};
use crate::defaults::errors::{RESPONSE_HEADING, UNKNOWN_ERROR_MESSAGE};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref RESOURCE_PATTERNS: [Regex; 3] = [
        resource_pattern("deployment"),
        resource_pattern("model"),
        resource_pattern("resource"),
    ];
}

fn resource_pattern(label: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)\b{label}[:\s]+['"]?([A-Za-z0-9_\-]+(?:\.[A-Za-z0-9_\-]+)*)"#
    ))
    .expect("valid resource pattern")
}

/// Classify a failure.
///
/// `context` is only attached to the result (url, request body, response
/// headers); it does not influence the chosen kind.
pub fn classify(failure: Failure, context: Option<&RequestContext>) -> ProviderError {
    if let Failure::Provider(err) = failure {
        return err;
    }

    let root = failure.root_cause();
    if let Failure::Provider(err) = root {
        return err.clone();
    }

    let mut classified = classify_root(root);

    if let Some(transport) = failure.transport().or_else(|| root.transport()) {
        attach_transport(&mut classified, transport);
    }
    if let Some(ctx) = context {
        classified.request = ctx.request_info();
        if let Some(headers) = &ctx.response_headers {
            classified.response_headers = Some(headers.clone());
        }
    }

    tracing::debug!(
        kind = ?classified.kind,
        status = classified.status_code,
        retryable = classified.retryable,
        "classified provider failure"
    );
    ProviderError::Classified(classified)
}

impl From<Failure> for ProviderError {
    fn from(failure: Failure) -> Self {
        classify(failure, None)
    }
}

fn classify_root(root: &Failure) -> ClassifiedError {
    match root {
        Failure::Value(value) => {
            if let Some(envelope) = match_envelope(value) {
                return from_envelope(&envelope);
            }
            match value {
                Value::String(text) => from_message(text),
                _ => unknown(UNKNOWN_ERROR_MESSAGE),
            }
        }
        Failure::Error(native) => match embedded_envelope(&native.message) {
            Some(envelope) => from_envelope(&envelope),
            None => from_message(&native.message),
        },
        Failure::Undefined | Failure::Provider(_) => unknown(UNKNOWN_ERROR_MESSAGE),
    }
}

fn unknown(message: &str) -> ClassifiedError {
    ClassifiedError::new(ErrorKind::Unknown, 500, false, message)
}

fn from_envelope(envelope: &ErrorEnvelope) -> ClassifiedError {
    let status = envelope.status_code();
    let text = envelope.message.as_str();

    let mut classified = match status {
        401 | 403 => ClassifiedError::new(
            ErrorKind::Authentication,
            status,
            false,
            format!(
                "Authentication failed: {text}. Check that the service key is valid and has access to the requested resource."
            ),
        ),
        404 => {
            let id = extract_resource_id(text, envelope.location.as_deref());
            ClassifiedError::new(
                ErrorKind::NotFound,
                status,
                false,
                format!(
                    "Resource not found: {text}. Model or deployment '{id}' does not exist or is not running."
                ),
            )
            .with_resource_id(id)
        }
        429 => ClassifiedError::new(
            ErrorKind::RateLimit,
            status,
            true,
            format!("Rate limit exceeded: {text}. Retry after a short delay."),
        ),
        s if s >= 500 => ClassifiedError::new(
            ErrorKind::Server,
            status,
            true,
            format!("Server error ({status}): {text}"),
        ),
        _ => {
            let mut message = format!("Invalid request ({status}): {text}");
            if let Some(location) = &envelope.location {
                message.push_str(&format!(" [location: {location}]"));
            }
            ClassifiedError::new(ErrorKind::Validation, status, false, message)
        }
    };

    if let Some(request_id) = &envelope.request_id {
        classified
            .message
            .push_str(&format!(" (request id: {request_id})"));
    }
    classified
}

fn from_message(message: &str) -> ClassifiedError {
    if message.trim().is_empty() {
        return unknown(UNKNOWN_ERROR_MESSAGE);
    }

    let lowered = message.to_lowercase();
    let Some(hit) = match_rules(&lowered) else {
        return unknown(message);
    };

    match (hit.rule.outcome, hit.status) {
        (
            RuleOutcome::Fixed {
                kind,
                status,
                retryable,
            },
            _,
        ) => ClassifiedError::new(kind, status, retryable, message),
        (RuleOutcome::ResourceNotFound, _) => {
            ClassifiedError::new(ErrorKind::NotFound, 404, false, message)
                .with_resource_id(extract_resource_id(message, None))
        }
        (RuleOutcome::StatusFromMessage, Some(status)) => {
            ClassifiedError::from_status(status, message)
        }
        (RuleOutcome::StatusFromMessage, None) => unknown(message),
    }
}

/// Pull a model or deployment identifier out of an error message, then out of
/// the location; fall back to the first token of the location, then
/// `"unknown"`.
pub fn extract_resource_id(message: &str, location: Option<&str>) -> String {
    let sources = std::iter::once(message).chain(location);
    for source in sources {
        for pattern in RESOURCE_PATTERNS.iter() {
            if let Some(id) = pattern.captures(source).and_then(|c| c.get(1)) {
                return id.as_str().to_string();
            }
        }
    }
    location
        .and_then(|l| l.split_whitespace().next())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

fn attach_transport(classified: &mut ClassifiedError, transport: &TransportError) {
    let Some(response) = &transport.response else {
        return;
    };
    if let Some(body) = response_data_body(&response.data) {
        classified
            .message
            .push_str(&format!("\n\n{RESPONSE_HEADING}\n{body}"));
        classified.response_body = Some(body);
    }
    let headers = normalize_headers(&response.headers);
    if !headers.is_empty() {
        classified.response_headers = Some(headers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NativeError, ResponseData};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn classified(err: ProviderError) -> ClassifiedError {
        match err {
            ProviderError::Classified(c) => c,
            other => panic!("expected classified error, got {other:?}"),
        }
    }

    #[test]
    fn classified_input_passes_through() {
        let original = ClassifiedError::new(ErrorKind::RateLimit, 429, true, "slow down");
        let out = classify(original.clone().into(), None);
        assert_eq!(out, ProviderError::Classified(original));
    }

    #[test]
    fn domain_errors_pass_through() {
        let err = ProviderError::LoadApiKey {
            message: "AICORE_SERVICE_KEY is not set".into(),
        };
        assert_eq!(classify(err.clone().into(), None), err);
    }

    #[test]
    fn not_found_envelope_extracts_identifier() {
        let c = classified(classify(
            json!({"error": {"code": 404, "message": "Model deployment-abc-123 not found"}})
                .into(),
            None,
        ));
        assert_eq!(c.kind, ErrorKind::NotFound);
        assert_eq!(c.resource_id.as_deref(), Some("deployment-abc-123"));
        assert!(!c.retryable);
    }

    #[test]
    fn not_found_falls_back_to_location_then_unknown() {
        assert_eq!(
            extract_resource_id("gone", Some("deployment: d-77 in resource group")),
            "d-77"
        );
        assert_eq!(extract_resource_id("gone", Some("LLM Module")), "LLM");
        assert_eq!(extract_resource_id("gone", None), "unknown");
    }

    #[test]
    fn auth_envelope_adds_guidance_and_request_id() {
        let c = classified(classify(
            json!({"error": {"code": 403, "message": "Forbidden", "request_id": "req-9"}}).into(),
            None,
        ));
        assert_eq!(c.kind, ErrorKind::Authentication);
        assert!(c.message.contains("service key"));
        assert!(c.message.contains("req-9"));
    }

    #[test]
    fn validation_envelope_includes_location() {
        let c = classified(classify(
            json!({"error": {"code": 400, "message": "Bad template", "location": "Templating Module"}})
                .into(),
            None,
        ));
        assert_eq!(c.kind, ErrorKind::Validation);
        assert!(!c.retryable);
        assert!(c.message.contains("Templating Module"));
    }

    #[test]
    fn status_code_in_message() {
        let c = classified(classify(
            NativeError::new("Request failed with status code 429.").into(),
            None,
        ));
        assert_eq!(c.status_code, 429);
        assert_eq!(c.kind, ErrorKind::RateLimit);
        assert!(c.retryable);
    }

    #[test]
    fn embedded_envelope_in_message() {
        let message = "Error received from the server.\n{\"error\":{\"code\":503,\"message\":\"Service unavailable\",\"request_id\":\"r1\"}}";
        let c = classified(classify(NativeError::new(message).into(), None));
        assert_eq!(c.status_code, 503);
        assert!(c.retryable);
        assert!(c.message.contains("Service unavailable"));
        assert!(c.message.contains("r1"));
    }

    #[test]
    fn unknown_inputs_use_placeholder() {
        for failure in [
            Failure::Undefined,
            Failure::Value(Value::Null),
            Failure::Value(json!(42)),
            Failure::Value(json!({"weird": true})),
        ] {
            let c = classified(classify(failure, None));
            assert_eq!(c.kind, ErrorKind::Unknown);
            assert_eq!(c.status_code, 500);
            assert!(!c.retryable);
            assert_eq!(c.message, UNKNOWN_ERROR_MESSAGE);
        }
    }

    #[test]
    fn unmatched_text_keeps_original_message() {
        let c = classified(classify("the flux capacitor melted".into(), None));
        assert_eq!(c.kind, ErrorKind::Unknown);
        assert_eq!(c.message, "the flux capacitor melted");
    }

    #[test]
    fn cause_chain_is_unwrapped() {
        let failure = NativeError::new("Orchestration call failed")
            .with_cause(NativeError::new("connect ECONNREFUSED 10.0.0.1:443"));
        let c = classified(classify(failure.into(), None));
        assert_eq!(c.kind, ErrorKind::Network);
        assert_eq!(c.status_code, 503);
    }

    #[test]
    fn transport_body_and_headers_are_attached() {
        let transport = TransportError::with_response(
            400,
            ResponseData::Json(json!({"error": {"message": "bad input"}})),
        )
        .with_header("x-request-id", json!("abc"));
        let failure = NativeError::new("Request failed with status code 400")
            .with_transport(transport);
        let c = classified(classify(failure.into(), None));
        assert_eq!(c.status_code, 400);
        assert!(c.message.contains("Error Response:"));
        assert!(c.response_body.as_deref().unwrap().contains("bad input"));
        assert_eq!(c.response_headers.unwrap()["x-request-id"], "abc");
    }

    #[test]
    fn explicit_context_headers_win() {
        let transport = TransportError::with_response(500, ResponseData::Empty)
            .with_header("x-source", json!("transport"));
        let failure = NativeError::new("boom").with_transport(transport);
        let mut headers = BTreeMap::new();
        headers.insert("x-source".to_string(), "context".to_string());
        let ctx = RequestContext::new()
            .with_url("https://api.example.invalid/v2/completion")
            .with_response_headers(headers);

        let c = classified(classify(failure.into(), Some(&ctx)));
        assert_eq!(c.response_headers.unwrap()["x-source"], "context");
        assert_eq!(
            c.request.unwrap().url.as_deref(),
            Some("https://api.example.invalid/v2/completion")
        );
        assert_eq!(c.response_body, None);
    }
}
