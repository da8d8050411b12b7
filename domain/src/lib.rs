//! Domain layer for sci-storm
//!
//! This crate contains the core entities and rules of the drafting pipeline.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Checkpoints
//!
//! The pipeline moves through a fixed sequence of human checkpoints
//! ([`Stage`]): style/goal, roster, outline, debate, synthesis. A stage is
//! entered only after its predecessor was approved ([`HumanDecision`]).
//!
//! ## Evidence
//!
//! Every source (tool server, local reference corpus, web search, expert
//! statements) is normalized into an [`EvidenceRecord`] whose id is derived
//! from its content fingerprint.

pub mod brief;
pub mod checkpoint;
pub mod core;
pub mod debate;
pub mod draft;
pub mod evidence;
pub mod outline;
pub mod prompt;
pub mod roster;

// Re-export commonly used types
pub use brief::{DocumentBrief, DocumentStyle};
pub use checkpoint::{DecisionKind, HumanDecision, Proposal, Stage};
pub use core::{
    error::DomainError,
    message::{ChatMessage, Role},
};
pub use debate::{DebateOutcome, DialogueTurn, Speaker, Transcript};
pub use draft::{Document, DraftSection};
pub use evidence::{EvidenceKind, EvidenceLedger, EvidenceRecord, merge_by_priority};
pub use outline::{Outline, OutlineSection, parse_outline, parse_outline_strict};
pub use prompt::PromptTemplate;
pub use roster::{ExpertPatch, ExpertProfile, MODERATOR_ID, RosterEdit, RosterManager};
