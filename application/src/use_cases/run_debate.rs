//! Run Debate use case
//!
//! Runs a fixed number of rounds. In every round each expert speaks once,
//! in roster order, with the full prior transcript, the approved outline and
//! freshly gathered evidence for their focus. Between rounds the reviewer
//! may add a moderator turn that all later speakers see.

use crate::ports::completion::{CompletionBackend, CompletionOptions};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::reviewer::CheckpointReviewer;
use crate::use_cases::gather_evidence::GatherEvidenceUseCase;
use crate::use_cases::shared::{StageError, check_cancelled, complete_cancellable};
use std::sync::Arc;
use storm_domain::{
    DebateOutcome, DialogueTurn, DocumentBrief, DomainError, EvidenceLedger, EvidenceRecord,
    ExpertProfile, Outline, PromptTemplate, RosterManager, Transcript,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Input for the RunDebate use case
#[derive(Debug, Clone, Copy)]
pub struct RunDebateInput<'a> {
    pub brief: &'a DocumentBrief,
    pub outline: &'a Outline,
    pub roster: &'a RosterManager,
    pub rounds: usize,
    /// Reviewer feedback from a rejected debate, opens the transcript as a
    /// moderator turn
    pub guidance: Option<&'a str>,
}

/// Use case for running the expert debate
pub struct RunDebateUseCase {
    backend: Arc<dyn CompletionBackend>,
    evidence: GatherEvidenceUseCase,
    options: CompletionOptions,
}

impl RunDebateUseCase {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        evidence: GatherEvidenceUseCase,
        options: CompletionOptions,
    ) -> Self {
        Self {
            backend,
            evidence,
            options,
        }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunDebateInput<'_>,
        reviewer: &dyn CheckpointReviewer,
        cancel: &CancellationToken,
    ) -> Result<DebateOutcome, StageError> {
        self.execute_with_progress(input, reviewer, cancel, &NoProgress)
            .await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunDebateInput<'_>,
        reviewer: &dyn CheckpointReviewer,
        cancel: &CancellationToken,
        progress: &dyn ProgressNotifier,
    ) -> Result<DebateOutcome, StageError> {
        if input.roster.is_empty() {
            return Err(DomainError::EmptyRoster.into());
        }

        info!(
            "Starting debate: {} rounds, {} experts",
            input.rounds,
            input.roster.len()
        );

        let mut outcome = DebateOutcome::default();
        if let Some(guidance) = input.guidance.map(str::trim).filter(|g| !g.is_empty()) {
            outcome.transcript.append(DialogueTurn::moderator(0, guidance));
        }

        for round in 0..input.rounds {
            debug!("Debate round {}", round + 1);

            for expert in input.roster.experts() {
                check_cancelled(cancel)?;
                let turn = self
                    .take_turn(&input, expert, round, &outcome.transcript, &mut outcome.ledger, cancel)
                    .await?;
                progress.on_turn_complete(round, &expert.id);
                outcome.transcript.append(turn);
            }

            if round + 1 < input.rounds {
                let note = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(StageError::Cancelled),
                    note = reviewer.interject(round, &outcome.transcript) => note?,
                };
                if let Some(note) = note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                    info!("Moderator interjection after round {}", round + 1);
                    outcome
                        .transcript
                        .append(DialogueTurn::moderator(round, note));
                }
            }
        }

        info!("Debate finished with {} turns", outcome.transcript.len());
        Ok(outcome)
    }

    async fn take_turn(
        &self,
        input: &RunDebateInput<'_>,
        expert: &ExpertProfile,
        round: usize,
        transcript: &Transcript,
        ledger: &mut EvidenceLedger,
        cancel: &CancellationToken,
    ) -> Result<DialogueTurn, StageError> {
        let topic = format!("{} {}", input.brief.goal, expert.focus());
        let evidence = self.evidence.gather(&topic, cancel).await?;

        let prompt = PromptTemplate::debate_turn_prompt(
            input.brief,
            input.outline,
            expert,
            round,
            &transcript.render(),
            &evidence,
        );
        let statement = complete_cancellable(
            self.backend.as_ref(),
            &PromptTemplate::debate_system(expert),
            &prompt,
            &self.options,
            cancel,
        )
        .await?;

        let cited = cited_records(&statement, &evidence);
        let cited_ids = cited.iter().map(|r| r.id.clone()).collect();
        ledger.extend(cited);

        Ok(DialogueTurn::expert(round, &expert.id, statement, cited_ids))
    }
}

/// Records the statement names by id, or every gathered record when it
/// names none.
fn cited_records(statement: &str, evidence: &[EvidenceRecord]) -> Vec<EvidenceRecord> {
    let named: Vec<EvidenceRecord> = evidence
        .iter()
        .filter(|r| statement.contains(&r.id))
        .cloned()
        .collect();
    if named.is_empty() {
        evidence.to_vec()
    } else {
        named
    }
}
