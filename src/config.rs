//! Provider and per-call configuration

use crate::defaults::DEFAULT_PROVIDER_NAME;
use crate::types::ApiFlavor;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Settings fixed when the model is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderSettings {
    /// Key under which provider metadata is reported.
    pub provider_name: String,
    /// Flavor used when a call does not pick one.
    pub api: ApiFlavor,
    /// Emit `raw` events unless a call says otherwise.
    pub include_raw_chunks: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider_name: DEFAULT_PROVIDER_NAME.to_string(),
            api: ApiFlavor::default(),
            include_raw_chunks: false,
        }
    }
}

impl ProviderSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = name.into();
        self
    }

    pub fn with_api(mut self, api: ApiFlavor) -> Self {
        self.api = api;
        self
    }

    pub fn with_raw_chunks(mut self, include: bool) -> Self {
        self.include_raw_chunks = include;
        self
    }
}

/// Per-call options of `do_generate`.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Overrides [`ProviderSettings::api`] for this call.
    pub api: Option<ApiFlavor>,
}

impl GenerateOptions {
    pub fn with_api(mut self, api: ApiFlavor) -> Self {
        self.api = Some(api);
        self
    }
}

/// Per-call options of `do_stream`.
#[derive(Debug, Clone, Default)]
pub struct StreamOptions {
    /// Overrides [`ProviderSettings::include_raw_chunks`] for this call.
    pub include_raw_chunks: Option<bool>,
    /// Overrides [`ProviderSettings::api`] for this call.
    pub api: Option<ApiFlavor>,
    /// Forwarded to the backend transport.
    pub abort: Option<CancellationToken>,
    /// Request body recorded on errors of this call.
    pub request_body: Option<String>,
}

impl StreamOptions {
    pub fn with_raw_chunks(mut self, include: bool) -> Self {
        self.include_raw_chunks = Some(include);
        self
    }

    pub fn with_api(mut self, api: ApiFlavor) -> Self {
        self.api = Some(api);
        self
    }

    pub fn with_abort(mut self, token: CancellationToken) -> Self {
        self.abort = Some(token);
        self
    }

    pub fn with_request_body(mut self, body: impl Into<String>) -> Self {
        self.request_body = Some(body.into());
        self
    }
}
