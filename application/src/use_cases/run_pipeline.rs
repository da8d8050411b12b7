//! Run pipeline use case
//!
//! Drives a [`CheckpointOrchestrator`] to completion by asking a
//! [`CheckpointReviewer`] for every decision.

use crate::ports::reviewer::{CheckpointReviewer, ReviewError};
use crate::use_cases::orchestrator::{CheckpointOrchestrator, PipelineError, PipelineStatus};
use crate::use_cases::shared::StageError;
use storm_domain::{Document, HumanDecision};
use tracing::{debug, info, warn};

/// Invalid decisions accepted in a row at one checkpoint before giving up
const MAX_INVALID_DECISIONS: usize = 10;

/// Use case for running the whole checkpointed pipeline
pub struct RunPipelineUseCase<'a> {
    orchestrator: &'a mut CheckpointOrchestrator,
    reviewer: &'a dyn CheckpointReviewer,
}

impl<'a> RunPipelineUseCase<'a> {
    pub fn new(
        orchestrator: &'a mut CheckpointOrchestrator,
        reviewer: &'a dyn CheckpointReviewer,
    ) -> Self {
        Self {
            orchestrator,
            reviewer,
        }
    }

    /// Loop over checkpoints until the document is done or the run stops.
    ///
    /// A cancelled review, or cancelling the orchestrator's token while a
    /// review is open, counts as an abort. Aborting returns
    /// [`PipelineError::Aborted`]. A decision that fails validation is
    /// reported to the reviewer and the same checkpoint is reviewed again.
    pub async fn execute(self) -> Result<Document, PipelineError> {
        let cancel = self.orchestrator.cancellation_token();
        let mut status = self.orchestrator.start().await?;
        let mut invalid_in_a_row = 0;
        loop {
            let proposal = match status {
                PipelineStatus::AwaitingDecision(proposal) => proposal,
                PipelineStatus::Done(document) => {
                    info!("Pipeline finished with {} sections", document.sections.len());
                    return Ok(document);
                }
                PipelineStatus::Aborted => return Err(PipelineError::Aborted),
            };

            let stage = proposal.stage();
            let review = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ReviewError::Cancelled),
                review = self.reviewer.review(&proposal) => review,
            };
            let decision = match review {
                Ok(decision) => decision,
                Err(ReviewError::Cancelled) => HumanDecision::Abort,
                Err(e) => {
                    return Err(PipelineError::Halted {
                        stage,
                        source: StageError::Review(e),
                    });
                }
            };
            debug!("Reviewer decided {} at {}", decision.kind(), stage);
            status = match self.orchestrator.advance(decision).await {
                Ok(status) => {
                    invalid_in_a_row = 0;
                    status
                }
                Err(e) if e.is_recoverable() && invalid_in_a_row < MAX_INVALID_DECISIONS => {
                    invalid_in_a_row += 1;
                    warn!("Decision at {} not applied: {}", stage, e);
                    self.reviewer.decision_rejected(stage, &e.to_string());
                    self.orchestrator.start().await?
                }
                Err(e) => return Err(e),
            };
        }
    }
}
