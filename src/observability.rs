//! Tracing setup
//!
//! The crate only emits `tracing` events; installing a subscriber is left to
//! the application. [`init_tracing`] is a convenience for binaries and tests
//! that have no subscriber of their own.
//!
//! ```rust,ignore
//! use siumai_bridge::observability::{TracingConfig, OutputFormat, init_tracing};
//!
//! init_tracing(&TracingConfig::builder().level(tracing::Level::DEBUG).build())?;
//! ```

use thiserror::Error;

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Multi-line, human-readable
    #[default]
    Pretty,
    /// Single-line text
    Compact,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub level: tracing::Level,
    pub format: OutputFormat,
    /// Extra `EnvFilter` directives, e.g. `"reqwest=warn"`.
    pub directives: Vec<String>,
    /// Let `RUST_LOG` override the configured level.
    pub respect_env: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            format: OutputFormat::default(),
            directives: Vec::new(),
            respect_env: true,
        }
    }
}

impl TracingConfig {
    pub fn builder() -> TracingConfigBuilder {
        TracingConfigBuilder::default()
    }

    /// Filter expression handed to `EnvFilter`.
    pub fn filter_directives(&self) -> String {
        let level = self.level.as_str().to_lowercase();
        std::iter::once(format!("siumai_bridge={level}"))
            .chain(self.directives.iter().cloned())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Default)]
pub struct TracingConfigBuilder {
    level: Option<tracing::Level>,
    format: Option<OutputFormat>,
    directives: Vec<String>,
    respect_env: Option<bool>,
}

impl TracingConfigBuilder {
    pub fn level(mut self, level: tracing::Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the level from `trace`, `debug`, `info`, `warn` or `error`.
    pub fn level_str(mut self, level: &str) -> Result<Self, TracingInitError> {
        let parsed = level
            .parse::<tracing::Level>()
            .map_err(|_| TracingInitError::InvalidLevel(level.to_string()))?;
        self.level = Some(parsed);
        Ok(self)
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn respect_env(mut self, respect: bool) -> Self {
        self.respect_env = Some(respect);
        self
    }

    pub fn build(self) -> TracingConfig {
        TracingConfig {
            level: self.level.unwrap_or(tracing::Level::INFO),
            format: self.format.unwrap_or_default(),
            directives: self.directives,
            respect_env: self.respect_env.unwrap_or(true),
        }
    }
}

#[derive(Debug, Error)]
pub enum TracingInitError {
    #[error("Invalid log level: {0}. Valid options: trace, debug, info, warn, error")]
    InvalidLevel(String),
    #[error("Invalid filter directives: {0}")]
    InvalidFilter(String),
    #[error("Failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Install a global `tracing-subscriber` fmt subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TracingInitError> {
    use tracing_subscriber::EnvFilter;

    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(env) if config.respect_env && !env.trim().is_empty() => EnvFilter::try_new(env),
        _ => EnvFilter::try_new(config.filter_directives()),
    }
    .map_err(|e| TracingInitError::InvalidFilter(e.to_string()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let result = match config.format {
        OutputFormat::Pretty => builder.pretty().try_init(),
        OutputFormat::Compact => builder.compact().try_init(),
        OutputFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| TracingInitError::Install(e.to_string()))
}
