//! Checkpoint orchestrator
//!
//! The pipeline state machine. Every working stage produces a [`Proposal`]
//! and then waits: [`CheckpointOrchestrator::start`] and
//! [`CheckpointOrchestrator::advance`] return
//! [`PipelineStatus::AwaitingDecision`] instead of blocking on input, so any
//! transport (terminal, auto-approve, scripted tests) can supply decisions.
//!
//! # Flow
//!
//! ```text
//! STYLE_GOAL ──approve──▶ ROSTER ──approve──▶ OUTLINE ──approve──▶ DEBATE
//!     ▲  │ reject(f)        ▲  │ edit / reject    ▲  │ reject(f)      │
//!     └──┘                  └──┘                  └──┘                │ approve
//!                                                                     ▼
//!                         DONE ◀──approve── SYNTHESIS ◀───────────────┘
//!
//! any non-terminal stage ──abort──▶ ABORTED
//! ```
//!
//! Every approval is appended to the decision log together with the approved
//! artifact. Constructing an orchestrator replays that log, so a rerun
//! resumes after the last approved checkpoint.

use crate::ports::completion::{CompletionBackend, CompletionOptions};
use crate::ports::decision_log::{DecisionLog, DecisionLogError, DecisionRecord};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::reviewer::CheckpointReviewer;
use crate::use_cases::gather_evidence::GatherEvidenceUseCase;
use crate::use_cases::negotiate_outline::NegotiateOutlineUseCase;
use crate::use_cases::run_debate::{RunDebateInput, RunDebateUseCase};
use crate::use_cases::shared::StageError;
use crate::use_cases::synthesize_draft::{SynthesizeDraftInput, SynthesizeDraftUseCase};
use std::sync::Arc;
use storm_domain::{
    DebateOutcome, DecisionKind, Document, DocumentBrief, DomainError, HumanDecision, Outline,
    Proposal, RosterManager, Stage,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors returned by the orchestrator
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("pipeline halted at {stage} ({}): {source}", .source.component())]
    Halted {
        stage: Stage,
        #[source]
        source: StageError,
    },

    #[error("pipeline was aborted")]
    Aborted,

    #[error("decision '{kind}' is not valid at {stage}")]
    InvalidDecision { stage: Stage, kind: DecisionKind },

    /// The decision failed validation; the checkpoint is unchanged.
    #[error("cannot apply decision at {stage}: {source}")]
    DecisionRejected {
        stage: Stage,
        #[source]
        source: DomainError,
    },

    #[error("no proposal is pending at {0}; call start() first")]
    NothingPending(Stage),

    #[error(transparent)]
    DecisionLog(#[from] DecisionLogError),

    #[error("cannot replay decision log: {0}")]
    Replay(String),

    #[error("no approved {0} artifact available")]
    MissingArtifact(Stage),

    #[error("cannot record {stage} artifact: {message}")]
    Artifact { stage: Stage, message: String },
}

impl PipelineError {
    /// Stage the pipeline stopped at, when it halted on a producer error.
    pub fn halted_stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Halted { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The checkpoint is still pending and can be decided again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::DecisionRejected { .. } | PipelineError::InvalidDecision { .. }
        )
    }
}

/// What the caller has to do next
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStatus {
    /// A proposal is waiting for a [`HumanDecision`].
    AwaitingDecision(Proposal),
    /// The pipeline finished; the document is final.
    Done(Document),
    /// The pipeline was aborted by the reviewer.
    Aborted,
}

/// The stage producers that talk to the backend
pub struct StageProducers {
    pub outline: NegotiateOutlineUseCase,
    pub debate: RunDebateUseCase,
    pub synthesis: SynthesizeDraftUseCase,
}

impl StageProducers {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        evidence: GatherEvidenceUseCase,
        options: CompletionOptions,
    ) -> Self {
        Self {
            outline: NegotiateOutlineUseCase::new(Arc::clone(&backend), options),
            debate: RunDebateUseCase::new(Arc::clone(&backend), evidence.clone(), options),
            synthesis: SynthesizeDraftUseCase::new(backend, evidence, options),
        }
    }
}

/// Starting material supplied by the user
#[derive(Debug, Clone)]
pub struct PipelineSeed {
    pub brief: DocumentBrief,
    /// Explicit roster (e.g. from a roster file); the default panel otherwise
    pub roster: Option<RosterManager>,
    pub rounds: usize,
}

impl PipelineSeed {
    pub fn new(brief: DocumentBrief, rounds: usize) -> Self {
        Self {
            brief,
            roster: None,
            rounds,
        }
    }

    pub fn with_roster(mut self, roster: RosterManager) -> Self {
        self.roster = Some(roster);
        self
    }
}

/// Approved artifacts and the current position in the pipeline
#[derive(Debug, Default)]
struct PipelineState {
    stage: Stage,
    brief: Option<DocumentBrief>,
    roster: Option<RosterManager>,
    outline: Option<Outline>,
    debate: Option<DebateOutcome>,
    document: Option<Document>,
    /// Proposal of the current stage, waiting for a decision
    pending: Option<Proposal>,
}

impl PipelineState {
    fn commit(&mut self, proposal: Proposal) {
        match proposal {
            Proposal::StyleGoal(brief) => self.brief = Some(brief),
            Proposal::Roster(roster) => self.roster = Some(roster),
            Proposal::Outline(outline) => self.outline = Some(outline),
            Proposal::Debate(outcome) => self.debate = Some(outcome),
            Proposal::Synthesis(document) => self.document = Some(document),
        }
    }
}

/// The checkpoint state machine
pub struct CheckpointOrchestrator {
    producers: StageProducers,
    reviewer: Arc<dyn CheckpointReviewer>,
    log: Arc<dyn DecisionLog>,
    progress: Arc<dyn ProgressNotifier>,
    seed: PipelineSeed,
    state: PipelineState,
    cancel: CancellationToken,
}

impl CheckpointOrchestrator {
    /// Build an orchestrator and replay the decision log.
    ///
    /// `reviewer` is only consulted for moderator interjections between
    /// debate rounds; checkpoint decisions arrive through [`advance`](Self::advance).
    pub fn new(
        producers: StageProducers,
        reviewer: Arc<dyn CheckpointReviewer>,
        log: Arc<dyn DecisionLog>,
        seed: PipelineSeed,
    ) -> Result<Self, PipelineError> {
        let mut orchestrator = Self {
            producers,
            reviewer,
            log,
            progress: Arc::new(NoProgress),
            seed,
            state: PipelineState::default(),
            cancel: CancellationToken::new(),
        };
        orchestrator.replay()?;
        Ok(orchestrator)
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    pub fn pending(&self) -> Option<&Proposal> {
        self.state.pending.as_ref()
    }

    pub fn document(&self) -> Option<&Document> {
        self.state.document.as_ref()
    }

    /// Token that aborts the in-flight stage when cancelled (e.g. on Ctrl-C).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Present the current checkpoint, producing its proposal if needed.
    pub async fn start(&mut self) -> Result<PipelineStatus, PipelineError> {
        match self.state.stage {
            Stage::Done => self.done_status(),
            Stage::Aborted => Err(PipelineError::Aborted),
            stage => match &self.state.pending {
                Some(proposal) => Ok(PipelineStatus::AwaitingDecision(proposal.clone())),
                None => self.produce(stage, None).await,
            },
        }
    }

    /// Apply a decision to the current checkpoint.
    pub async fn advance(&mut self, decision: HumanDecision) -> Result<PipelineStatus, PipelineError> {
        let stage = self.state.stage;
        match stage {
            Stage::Done => return self.done_status(),
            Stage::Aborted => return Err(PipelineError::Aborted),
            _ => {}
        }

        if let HumanDecision::Abort = decision {
            return self.abort(stage);
        }

        if self.state.pending.is_none() {
            return Err(PipelineError::NothingPending(stage));
        }

        debug!("Decision at {}: {}", stage, decision.kind());

        match decision {
            HumanDecision::Approve => self.approve(stage).await,
            HumanDecision::RejectWithFeedback(feedback) => {
                if let Some(Proposal::StyleGoal(brief)) = &self.state.pending {
                    brief
                        .refine(&feedback)
                        .map_err(|source| PipelineError::DecisionRejected { stage, source })?;
                }
                self.log.append(
                    &DecisionRecord::new(stage, DecisionKind::RejectWithFeedback)
                        .with_feedback(feedback.clone()),
                )?;
                info!("{} rejected with feedback, regenerating", stage);
                self.produce(stage, Some(&feedback)).await
            }
            HumanDecision::EditRoster(edits) => {
                let Some(Proposal::Roster(current)) = &self.state.pending else {
                    return Err(PipelineError::InvalidDecision {
                        stage,
                        kind: DecisionKind::EditRoster,
                    });
                };
                let mut roster = current.clone();
                roster
                    .apply_edits(&edits)
                    .map_err(|source| PipelineError::DecisionRejected { stage, source })?;

                let artifact = serde_json::to_value(&edits).map_err(|e| PipelineError::Artifact {
                    stage,
                    message: e.to_string(),
                })?;
                self.log.append(
                    &DecisionRecord::new(stage, DecisionKind::EditRoster).with_artifact(artifact),
                )?;

                info!("Applied {} roster edits", edits.len());
                let proposal = Proposal::Roster(roster);
                self.state.pending = Some(proposal.clone());
                Ok(PipelineStatus::AwaitingDecision(proposal))
            }
            HumanDecision::Abort => self.abort(stage),
        }
    }

    async fn approve(&mut self, stage: Stage) -> Result<PipelineStatus, PipelineError> {
        let Some(proposal) = self.state.pending.clone() else {
            return Err(PipelineError::NothingPending(stage));
        };

        if let Proposal::Roster(roster) = &proposal {
            roster
                .ensure_ready()
                .map_err(|source| PipelineError::DecisionRejected { stage, source })?;
        }

        let artifact = serde_json::to_value(&proposal).map_err(|e| PipelineError::Artifact {
            stage,
            message: e.to_string(),
        })?;
        self.log.append(&DecisionRecord::approved(stage, artifact))?;

        self.state.commit(proposal);
        self.state.pending = None;
        let next = stage.next().unwrap_or(Stage::Done);
        self.state.stage = next;
        info!("{} approved, entering {}", stage, next);

        if next == Stage::Done {
            return self.done_status();
        }
        self.produce(next, None).await
    }

    fn abort(&mut self, stage: Stage) -> Result<PipelineStatus, PipelineError> {
        self.cancel.cancel();
        self.state.pending = None;
        self.state.stage = Stage::Aborted;
        warn!("Pipeline aborted at {}", stage);
        self.log
            .append(&DecisionRecord::new(stage, DecisionKind::Abort))?;
        Ok(PipelineStatus::Aborted)
    }

    fn done_status(&self) -> Result<PipelineStatus, PipelineError> {
        self.state
            .document
            .clone()
            .map(PipelineStatus::Done)
            .ok_or(PipelineError::MissingArtifact(Stage::Synthesis))
    }

    /// Run the producer for `stage`. On failure nothing about the pipeline
    /// position changes, except that cancellation ends in `Aborted`.
    async fn produce(
        &mut self,
        stage: Stage,
        feedback: Option<&str>,
    ) -> Result<PipelineStatus, PipelineError> {
        match stage {
            Stage::Done => return self.done_status(),
            Stage::Aborted => return Err(PipelineError::Aborted),
            _ => {}
        }

        self.progress.on_stage_start(stage);
        let result = self.run_producer(stage, feedback).await;
        self.progress.on_stage_complete(stage, result.is_ok());

        match result {
            Ok(proposal) => {
                self.state.pending = Some(proposal.clone());
                Ok(PipelineStatus::AwaitingDecision(proposal))
            }
            Err(source) if source.is_cancelled() => {
                self.abort(stage)?;
                Err(PipelineError::Aborted)
            }
            Err(source) => {
                warn!("{} producer failed: {}", stage, source);
                Err(PipelineError::Halted { stage, source })
            }
        }
    }

    async fn run_producer(
        &mut self,
        stage: Stage,
        feedback: Option<&str>,
    ) -> Result<Proposal, StageError> {
        let cancel = self.cancel.clone();
        match stage {
            Stage::StyleGoal => {
                let current = match &self.state.pending {
                    Some(Proposal::StyleGoal(brief)) => brief.clone(),
                    _ => self.seed.brief.clone(),
                };
                let brief = match feedback {
                    Some(feedback) => current.refine(feedback)?,
                    None => current,
                };
                Ok(Proposal::StyleGoal(brief))
            }
            Stage::Roster => {
                let brief = self.approved_brief();
                let roster = self
                    .seed
                    .roster
                    .clone()
                    .unwrap_or_else(|| RosterManager::seed_default(&brief));
                Ok(Proposal::Roster(roster))
            }
            Stage::Outline => {
                let brief = self.approved_brief();
                let roster = self.approved_roster()?;
                let outline = self
                    .producers
                    .outline
                    .propose(&brief, &roster, feedback, &cancel)
                    .await?;
                Ok(Proposal::Outline(outline))
            }
            Stage::Debate => {
                let brief = self.approved_brief();
                let outline = self.approved_outline()?;
                let roster = self
                    .state
                    .roster
                    .as_mut()
                    .ok_or(StageError::Domain(DomainError::EmptyRoster))?;
                if !roster.is_frozen() {
                    roster.freeze()?;
                }
                let roster = roster.clone();

                let input = RunDebateInput {
                    brief: &brief,
                    outline: &outline,
                    roster: &roster,
                    rounds: self.seed.rounds,
                    guidance: feedback,
                };
                let outcome = self
                    .producers
                    .debate
                    .execute_with_progress(input, self.reviewer.as_ref(), &cancel, self.progress.as_ref())
                    .await?;
                Ok(Proposal::Debate(outcome))
            }
            Stage::Synthesis => {
                let mut brief = self.approved_brief();
                if let Some(feedback) = feedback.map(str::trim).filter(|f| !f.is_empty()) {
                    brief.notes.push(feedback.to_string());
                }
                let outline = self.approved_outline()?;
                let debate = self.state.debate.clone().unwrap_or_default();

                let input = SynthesizeDraftInput {
                    brief: &brief,
                    outline: &outline,
                    debate: &debate,
                };
                let document = self
                    .producers
                    .synthesis
                    .execute_with_progress(input, &cancel, self.progress.as_ref())
                    .await?;
                Ok(Proposal::Synthesis(document))
            }
            // produce() handles terminal stages before calling this
            Stage::Done | Stage::Aborted => Err(StageError::Cancelled),
        }
    }

    fn approved_brief(&self) -> DocumentBrief {
        self.state
            .brief
            .clone()
            .unwrap_or_else(|| self.seed.brief.clone())
    }

    fn approved_roster(&self) -> Result<RosterManager, StageError> {
        self.state
            .roster
            .clone()
            .ok_or(StageError::Domain(DomainError::EmptyRoster))
    }

    fn approved_outline(&self) -> Result<Outline, StageError> {
        self.state.outline.clone().ok_or_else(|| {
            StageError::Domain(DomainError::MalformedOutline(
                "no approved outline".to_string(),
            ))
        })
    }

    /// Restore approved artifacts from the decision log.
    ///
    /// Only approvals count; reject, edit and abort entries are audit
    /// records. Approvals must follow the stage order.
    fn replay(&mut self) -> Result<(), PipelineError> {
        let records = self.log.load()?;
        let mut restored = 0;

        for record in records.iter().filter(|r| r.kind == DecisionKind::Approve) {
            let expected = self.state.stage;
            if record.stage != expected {
                return Err(PipelineError::Replay(format!(
                    "approval for {} found while {} was expected",
                    record.stage, expected
                )));
            }

            let artifact = record.artifact.clone().ok_or_else(|| {
                PipelineError::Replay(format!("approval for {} has no artifact", record.stage))
            })?;
            let proposal: Proposal = serde_json::from_value(artifact).map_err(|e| {
                PipelineError::Replay(format!("{} artifact: {}", record.stage, e))
            })?;
            if proposal.stage() != record.stage {
                return Err(PipelineError::Replay(format!(
                    "{} approval carries a {} artifact",
                    record.stage,
                    proposal.stage()
                )));
            }

            self.state.commit(proposal);
            self.state.stage = expected.next().unwrap_or(Stage::Done);
            restored += 1;
        }

        if restored > 0 {
            info!(
                "Resumed from decision log: {} checkpoints approved, entering {}",
                restored, self.state.stage
            );
        }
        Ok(())
    }
}
