//! Human decisions recorded at checkpoints

use crate::roster::RosterEdit;
use serde::{Deserialize, Serialize};

/// Decision a human takes at a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "detail")]
pub enum HumanDecision {
    /// Accept the current proposal and move to the next stage.
    Approve,
    /// Regenerate the current proposal with the feedback attached.
    RejectWithFeedback(String),
    /// Apply roster edits and present the roster again (roster checkpoint only).
    EditRoster(Vec<RosterEdit>),
    /// Stop the pipeline. Terminal.
    Abort,
}

impl HumanDecision {
    pub fn kind(&self) -> DecisionKind {
        match self {
            HumanDecision::Approve => DecisionKind::Approve,
            HumanDecision::RejectWithFeedback(_) => DecisionKind::RejectWithFeedback,
            HumanDecision::EditRoster(_) => DecisionKind::EditRoster,
            HumanDecision::Abort => DecisionKind::Abort,
        }
    }

    pub fn is_approve(&self) -> bool {
        matches!(self, HumanDecision::Approve)
    }
}

/// Payload-free tag of a [`HumanDecision`], as stored in the decision log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Approve,
    RejectWithFeedback,
    EditRoster,
    Abort,
}

impl std::fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DecisionKind::Approve => "approve",
            DecisionKind::RejectWithFeedback => "reject_with_feedback",
            DecisionKind::EditRoster => "edit_roster",
            DecisionKind::Abort => "abort",
        };
        write!(f, "{}", s)
    }
}
