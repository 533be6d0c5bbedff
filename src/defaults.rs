//! Default values shared across the crate.

/// Provider name used as the provider-metadata key when none is configured.
pub const DEFAULT_PROVIDER_NAME: &str = "sap-ai";

/// Error classification limits.
pub mod errors {
    /// Maximum number of characters of a serialized response body kept in a
    /// classified error message.
    pub const RESPONSE_BODY_MAX_CHARS: usize = 2000;

    /// Marker appended to a response body cut at [`RESPONSE_BODY_MAX_CHARS`].
    pub const TRUNCATION_MARKER: &str = "...[truncated]";

    /// Upper bound on cause-chain hops followed while unwrapping a failure.
    pub const MAX_CAUSE_DEPTH: usize = 32;

    /// Message used when a failure carries no usable text.
    pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

    /// Heading placed before a transport response body in error messages.
    pub const RESPONSE_HEADING: &str = "Error Response:";
}
