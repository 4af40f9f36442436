//! Configuration types and loading
//!
//! Defaults are overridden by `WL_*` environment variables.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::WlError;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Remote collector endpoint
    pub collector: CollectorConfig,

    /// Filter builder defaults
    pub builder: BuilderConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectorConfig {
    /// URL accepting `{ "command": ..., "data": ... }` envelopes
    pub rpc_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuilderConfig {
    /// Title of a filter that has never been saved
    pub default_filter_title: String,
    /// Title reported to the collector when none is given
    pub default_collection_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            collector: CollectorConfig {
                rpc_url: "http://127.0.0.1:5001/api/command".to_string(),
                timeout_seconds: 30,
            },
            builder: BuilderConfig {
                default_filter_title: "New filter".to_string(),
                default_collection_title: "Untitled filter".to_string(),
            },
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl From<ConfigError> for WlError {
    fn from(err: ConfigError) -> Self {
        WlError::Config(err.to_string())
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Collector
        if let Some(url) = lookup("WL_COLLECTOR_URL") {
            config.collector.rpc_url = parse_rpc_url("WL_COLLECTOR_URL", &url)?.to_string();
        }
        if let Some(timeout) = lookup("WL_COLLECTOR_TIMEOUT") {
            config.collector.timeout_seconds =
                parse_number("WL_COLLECTOR_TIMEOUT", &timeout)?;
        }

        // Builder
        if let Some(title) = non_blank(lookup("WL_DEFAULT_FILTER_TITLE")) {
            config.builder.default_filter_title = title;
        }
        if let Some(title) = non_blank(lookup("WL_DEFAULT_COLLECTION_TITLE")) {
            config.builder.default_collection_title = title;
        }

        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an http(s) URL with a host
fn parse_rpc_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(format!("{e}: {raw:?}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("expected an http(s) URL, got {raw:?}")));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid(format!("missing host in {raw:?}")));
    }
    Ok(url)
}

fn parse_number(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected a non-negative integer, got {raw:?}"),
    })
}
