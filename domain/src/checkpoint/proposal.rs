//! Stage outputs presented to the reviewer

use super::stage::Stage;
use crate::brief::DocumentBrief;
use crate::debate::DebateOutcome;
use crate::draft::Document;
use crate::outline::Outline;
use crate::roster::RosterManager;
use serde::{Deserialize, Serialize};

/// What a stage produced and is waiting on a decision for.
///
/// Approved proposals are also the artifacts stored in the decision log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "stage", content = "artifact")]
pub enum Proposal {
    StyleGoal(DocumentBrief),
    Roster(RosterManager),
    Outline(Outline),
    Debate(DebateOutcome),
    Synthesis(Document),
}

impl Proposal {
    pub fn stage(&self) -> Stage {
        match self {
            Proposal::StyleGoal(_) => Stage::StyleGoal,
            Proposal::Roster(_) => Stage::Roster,
            Proposal::Outline(_) => Stage::Outline,
            Proposal::Debate(_) => Stage::Debate,
            Proposal::Synthesis(_) => Stage::Synthesis,
        }
    }
}
