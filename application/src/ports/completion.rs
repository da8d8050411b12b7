//! Completion backend port
//!
//! Defines the interface for chat-style text generation.

use super::transport::TransportError;
use crate::config::BackendProvider;
use async_trait::async_trait;
use storm_domain::ChatMessage;
use thiserror::Error;

/// Errors surfaced by a completion backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("{provider} backend unavailable after {attempts} attempts: {last_error}")]
    Unavailable {
        provider: BackendProvider,
        attempts: u32,
        last_error: String,
    },

    #[error("{provider} backend rejected credentials (HTTP {status})")]
    Auth { provider: BackendProvider, status: u16 },

    #[error("{provider} backend rejected the request (HTTP {status}): {message}")]
    Rejected {
        provider: BackendProvider,
        status: u16,
        message: String,
    },

    #[error("{provider} backend returned an invalid response: {message}")]
    InvalidResponse {
        provider: BackendProvider,
        message: String,
    },
}

impl BackendError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BackendError::Unavailable { .. })
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, BackendError::Auth { .. })
    }
}

/// Per-call generation options
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Uniform completion interface used by every pipeline stage.
///
/// The provider is fixed when the implementation is constructed.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, BackendError>;

    fn provider(&self) -> BackendProvider;
}

/// One provider-specific request/response exchange, without retries.
///
/// Implementations live in the infrastructure layer.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn send_once(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, TransportError>;

    fn provider(&self) -> BackendProvider;
}
