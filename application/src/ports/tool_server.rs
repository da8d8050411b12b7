//! Tool server port
//!
//! Defines the wire-level interface to the remote capability server.

use super::transport::TransportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by the tool-server client
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolServerError {
    #[error("tool server {url} unreachable after {attempts} health probes")]
    Unreachable { url: String, attempts: u32 },

    #[error("tool call '{capability}' failed: {source}")]
    Invocation {
        capability: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to start tool server with '{command}': {reason}")]
    Launch { command: String, reason: String },

    #[error("tool call '{capability}' failed after {attempts} attempts: {last_error}")]
    Exhausted {
        capability: String,
        attempts: u32,
        last_error: String,
    },
}

/// Body of a capability invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub capability: String,
    pub args: Value,
    /// Present only on calls the server may safely deduplicate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl ToolInvocation {
    pub fn new(capability: impl Into<String>, args: Value) -> Self {
        Self {
            capability: capability.into(),
            args,
            idempotency_key: None,
        }
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Single-attempt access to the tool server.
///
/// Implementations live in the infrastructure layer.
#[async_trait]
pub trait ToolServerTransport: Send + Sync {
    /// One health probe.
    async fn probe(&self) -> Result<(), TransportError>;

    /// One capability call.
    async fn invoke(&self, invocation: &ToolInvocation) -> Result<Value, TransportError>;

    /// Base URL, for error messages.
    fn base_url(&self) -> &str;
}

/// Starts the tool server process when it is not already running.
#[async_trait]
pub trait ServerLauncher: Send + Sync {
    /// Spawn the server. Returns once the process is started, not once it
    /// is healthy.
    async fn launch(&self) -> Result<(), ToolServerError>;
}
