//! Checkpoint reviewer port
//!
//! The human side of the pipeline. The orchestrator itself never blocks on
//! input: it returns a proposal and waits for `advance`. A reviewer is the
//! transport that turns a proposal into a decision.
//!
//! # Built-in Implementations
//!
//! - [`AutoApproveReviewer`] - approves every checkpoint, never interjects
//!
//! For interactive use, see `InteractiveCheckpointReviewer` in the
//! presentation layer.

use async_trait::async_trait;
use storm_domain::{HumanDecision, Proposal, Stage, Transcript};
use thiserror::Error;

/// Failure while collecting a decision (not a decision itself)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[async_trait]
pub trait CheckpointReviewer: Send + Sync {
    /// Present a proposal and return the decision on it.
    async fn review(&self, proposal: &Proposal) -> Result<HumanDecision, ReviewError>;

    /// Offer a moderator interjection after debate round `round` (zero-based).
    ///
    /// Defaults to no interjection.
    async fn interject(
        &self,
        _round: usize,
        _transcript: &Transcript,
    ) -> Result<Option<String>, ReviewError> {
        Ok(None)
    }

    /// Told that the last decision at `stage` could not be applied; the
    /// same proposal is reviewed again next.
    fn decision_rejected(&self, _stage: Stage, _reason: &str) {}
}

/// Approves every checkpoint. Used by `--yes`.
pub struct AutoApproveReviewer;

#[async_trait]
impl CheckpointReviewer for AutoApproveReviewer {
    async fn review(&self, _proposal: &Proposal) -> Result<HumanDecision, ReviewError> {
        Ok(HumanDecision::Approve)
    }
}
