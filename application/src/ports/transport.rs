//! Errors shared by the HTTP transports behind the backend and tool-server ports.

use thiserror::Error;

/// Failure of a single request attempt.
///
/// Transports report exactly what happened on the wire; the resilience layer
/// decides whether the attempt is worth repeating.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Timeouts, refused connections, 5xx and 429 are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Timeout | TransportError::Connect(_) => true,
            TransportError::Status { status, .. } => *status >= 500 || *status == 429,
            TransportError::Decode(_) => false,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, TransportError::Status { status: 401 | 403, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
