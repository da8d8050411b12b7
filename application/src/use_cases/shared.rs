//! Shared utilities for use cases.
//!
//! Contains the stage error type plus cancellation checking and the
//! cancellable backend call used by the outline, debate and synthesis
//! producers.

use crate::ports::completion::{BackendError, CompletionBackend, CompletionOptions};
use crate::ports::reviewer::ReviewError;
use crate::ports::tool_server::ToolServerError;
use crate::use_cases::gather_evidence::GatherError;
use storm_domain::{ChatMessage, DomainError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a stage producer failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    ToolServer(#[from] ToolServerError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("reviewer failed: {0}")]
    Review(#[from] ReviewError),

    #[error("stage cancelled")]
    Cancelled,
}

impl From<GatherError> for StageError {
    fn from(err: GatherError) -> Self {
        match err {
            GatherError::Cancelled => StageError::Cancelled,
        }
    }
}

impl StageError {
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            StageError::Cancelled
                | StageError::Domain(DomainError::Cancelled)
                | StageError::Review(ReviewError::Cancelled)
        )
    }

    /// Component to name in user-facing error messages.
    pub fn component(&self) -> &'static str {
        match self {
            StageError::Backend(_) => "completion backend",
            StageError::ToolServer(_) => "tool server",
            StageError::Domain(_) => "pipeline input",
            StageError::Review(_) => "reviewer",
            StageError::Cancelled => "pipeline",
        }
    }
}

/// Check if cancellation has been requested.
pub(crate) fn check_cancelled(token: &CancellationToken) -> Result<(), StageError> {
    if token.is_cancelled() {
        return Err(StageError::Cancelled);
    }
    Ok(())
}

/// Send a system/user exchange to the backend, giving up early on cancellation.
pub(crate) async fn complete_cancellable(
    backend: &dyn CompletionBackend,
    system: &str,
    user: &str,
    options: &CompletionOptions,
    cancel: &CancellationToken,
) -> Result<String, StageError> {
    check_cancelled(cancel)?;
    let messages = ChatMessage::exchange(system, user);

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StageError::Cancelled),
        result = backend.complete(&messages, options) => result.map_err(StageError::from),
    }
}
