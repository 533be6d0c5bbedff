//! Keyword classification table
//!
//! An ordered list of `(matcher, outcome)` rules evaluated top to bottom
//! against the lower-cased failure message. The first matching rule wins, so
//! the order is part of the contract (authentication keywords come before the
//! generic network ones, for instance).

use super::types::ErrorKind;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref STATUS_CODE_RE: Regex =
        Regex::new(r"status code (\d+)").expect("valid status code regex");
}

/// How a rule recognizes a message.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Any of the keywords occurs in the lower-cased message.
    Any(&'static [&'static str]),
    /// The message contains `status code N` with `N` in `[100, 600)`.
    StatusCode,
}

/// What a matching rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    Fixed {
        kind: ErrorKind,
        status: u16,
        retryable: bool,
    },
    /// 404 with a model/deployment identifier parsed from the message.
    ResourceNotFound,
    /// Status taken from the message; kind and retryability follow it.
    StatusFromMessage,
}

#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub name: &'static str,
    pub matcher: Matcher,
    pub outcome: RuleOutcome,
}

/// Result of a successful rule match.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RuleMatch {
    pub rule: &'static KeywordRule,
    pub status: Option<u16>,
}

impl Matcher {
    fn matches(&self, lowered: &str) -> Option<Option<u16>> {
        match self {
            Matcher::Any(keywords) => keywords
                .iter()
                .any(|k| lowered.contains(k))
                .then_some(None),
            Matcher::StatusCode => STATUS_CODE_RE
                .captures_iter(lowered)
                .filter_map(|caps| caps.get(1)?.as_str().parse::<u16>().ok())
                .find(|code| (100..600).contains(code))
                .map(Some),
        }
    }
}

const fn fixed(kind: ErrorKind, status: u16, retryable: bool) -> RuleOutcome {
    RuleOutcome::Fixed {
        kind,
        status,
        retryable,
    }
}

pub static KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        name: "authentication",
        matcher: Matcher::Any(&[
            "authentication",
            "unauthorized",
            "aicore_service_key",
            "invalid credentials",
            "service credentials",
            "service binding",
        ]),
        outcome: fixed(ErrorKind::Authentication, 401, false),
    },
    KeywordRule {
        name: "deployment-resolution",
        matcher: Matcher::Any(&["failed to resolve deployment", "no deployment matched"]),
        outcome: RuleOutcome::ResourceNotFound,
    },
    KeywordRule {
        name: "status-code",
        matcher: Matcher::StatusCode,
        outcome: RuleOutcome::StatusFromMessage,
    },
    KeywordRule {
        name: "network",
        matcher: Matcher::Any(&["econnrefused", "enotfound", "network", "timeout"]),
        outcome: fixed(ErrorKind::Network, 503, true),
    },
    KeywordRule {
        name: "destination",
        matcher: Matcher::Any(&["could not resolve destination"]),
        outcome: fixed(ErrorKind::Validation, 400, false),
    },
    KeywordRule {
        name: "content-filter",
        matcher: Matcher::Any(&[
            "content filtered",
            "filtered by the input filter",
            "filtered by the output filter",
        ]),
        outcome: fixed(ErrorKind::Validation, 400, false),
    },
    KeywordRule {
        name: "configuration",
        matcher: Matcher::Any(&[
            "either a prompt template or messages must be defined",
            "filtering parameters cannot be empty",
            "must be non-empty",
            "failed to parse json",
            "failed to parse yaml",
            "invalid json",
            "invalid yaml",
            "schema validation",
            "does not match the schema",
            "not an http response",
        ]),
        outcome: fixed(ErrorKind::Validation, 400, false),
    },
    KeywordRule {
        name: "stream-consumed",
        matcher: Matcher::Any(&["stream has already been consumed"]),
        outcome: fixed(ErrorKind::Server, 500, false),
    },
    KeywordRule {
        name: "streaming",
        matcher: Matcher::Any(&[
            "iterating over",
            "parse message into json",
            "received from the server",
            "no body",
            "invalid sse payload",
        ]),
        outcome: fixed(ErrorKind::Streaming, 500, true),
    },
    KeywordRule {
        name: "buffer-unavailable",
        matcher: Matcher::Any(&["buffer is not available"]),
        outcome: fixed(ErrorKind::Server, 500, false),
    },
    KeywordRule {
        name: "response-stream-missing",
        matcher: Matcher::Any(&["response stream is undefined"]),
        outcome: fixed(ErrorKind::Server, 500, false),
    },
    KeywordRule {
        name: "response-in-progress",
        matcher: Matcher::Any(&[
            "required to process",
            "stream is still open",
            "data is not available yet",
        ]),
        outcome: fixed(ErrorKind::Server, 500, true),
    },
    KeywordRule {
        name: "deployment-list",
        matcher: Matcher::Any(&["failed to fetch the list of deployments"]),
        outcome: fixed(ErrorKind::Server, 503, true),
    },
    KeywordRule {
        name: "chunk-type",
        matcher: Matcher::Any(&["uint8array"]),
        outcome: fixed(ErrorKind::Server, 500, false),
    },
];

/// First rule matching `lowered`, in table order.
pub(crate) fn match_rules(lowered: &str) -> Option<RuleMatch> {
    KEYWORD_RULES.iter().find_map(|rule| {
        rule.matcher
            .matches(lowered)
            .map(|status| RuleMatch { rule, status })
    })
}
