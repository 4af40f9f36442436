//! Remote collector
//!
//! The collector owns the writable databases. Every mutation is sent to it as
//! a `{ "command": ..., "data": ... }` envelope; the dashboard only reads.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument};
use wl_core::config::CollectorConfig;
use wl_core::error::WlError;
use wl_queries::filter::FilterConfig;

/// Command names understood by the collector
pub mod commands {
    pub const SAVE_FILTER: &str = "save_filter";
    pub const DELETE_FILTER: &str = "delete_filter";
    pub const TRIGGER_COLLECTION: &str = "trigger_collection";
}

/// Collector errors
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Collector unreachable: {0}")]
    Unavailable(String),
    #[error("Collector request timed out")]
    Timeout,
    #[error("Collector rejected {command}: {status} {message}")]
    Rejected {
        command: String,
        status: u16,
        message: String,
    },
    #[error("Invalid collector response: {0}")]
    InvalidResponse(String),
}

pub type CollectorResult<T> = Result<T, CollectorError>;

impl From<CollectorError> for WlError {
    fn from(err: CollectorError) -> Self {
        WlError::ExternalService {
            service: "collector".to_string(),
            message: err.to_string(),
        }
    }
}

/// Request body sent to the collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub command: String,
    pub data: Value,
}

impl CommandEnvelope {
    pub fn new(command: impl Into<String>, data: Value) -> Self {
        Self {
            command: command.into(),
            data,
        }
    }
}

/// Payload of `trigger_collection`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRequest {
    pub jql: String,
    pub filter_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<FilterConfig>,
}

impl CollectionRequest {
    pub const DEFAULT_TITLE: &'static str = "Untitled filter";

    pub fn new(jql: impl Into<String>) -> Self {
        Self {
            jql: jql.into(),
            filter_title: Self::DEFAULT_TITLE.to_string(),
            config: None,
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.filter_title = title.into();
        self
    }

    pub fn with_config(mut self, config: FilterConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Executes named commands on the collector
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &str, data: Value) -> CollectorResult<Value>;
}

/// Executor posting envelopes to the collector's HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    http_client: Client,
    rpc_url: String,
}

impl HttpExecutor {
    pub fn new(config: &CollectorConfig) -> CollectorResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CollectorError::Unavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            rpc_url: config.rpc_url.clone(),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait]
impl CommandExecutor for HttpExecutor {
    #[instrument(skip(self, data), fields(url = %self.rpc_url))]
    async fn execute(&self, command: &str, data: Value) -> CollectorResult<Value> {
        let envelope = CommandEnvelope::new(command, data);

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!(command, "Collector request timed out");
                    return CollectorError::Timeout;
                }
                error!(command, error = %e, "Collector unreachable");
                CollectorError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        debug!(command, status = %status, "Collector responded");

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CollectorError::Rejected {
                command: command.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CollectorError::InvalidResponse(e.to_string()))
    }
}

/// Executor that keeps every envelope in memory
///
/// Used in tests and when no collector is reachable. It can be switched to
/// fail so callers can exercise their error paths.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    envelopes: Mutex<Vec<CommandEnvelope>>,
    failure: Mutex<Option<String>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every following command with `message`
    pub async fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().await = Some(message.into());
    }

    pub async fn recover(&self) {
        *self.failure.lock().await = None;
    }

    /// Envelopes received so far, including rejected ones
    pub async fn envelopes(&self) -> Vec<CommandEnvelope> {
        self.envelopes.lock().await.clone()
    }

    pub async fn commands(&self) -> Vec<String> {
        self.envelopes
            .lock()
            .await
            .iter()
            .map(|e| e.command.clone())
            .collect()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn execute(&self, command: &str, data: Value) -> CollectorResult<Value> {
        self.envelopes
            .lock()
            .await
            .push(CommandEnvelope::new(command, data));

        if let Some(message) = self.failure.lock().await.clone() {
            return Err(CollectorError::Unavailable(message));
        }
        Ok(json!({ "status": "ok" }))
    }
}
