//! Transcript entities

use crate::evidence::{EvidenceKind, EvidenceLedger, EvidenceRecord};
use crate::roster::MODERATOR_ID;
use serde::{Deserialize, Serialize};

/// Who produced a turn
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Speaker {
    Expert(String),
    /// Human interjection between rounds
    Moderator,
}

impl Speaker {
    pub fn id(&self) -> &str {
        match self {
            Speaker::Expert(id) => id,
            Speaker::Moderator => MODERATOR_ID,
        }
    }

    pub fn is_moderator(&self) -> bool {
        matches!(self, Speaker::Moderator)
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// One statement in the debate (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueTurn {
    /// Zero-based round index
    pub round: usize,
    pub speaker: Speaker,
    pub statement: String,
    /// Ids of the evidence records the statement relies on
    #[serde(default)]
    pub cited_evidence: Vec<String>,
}

impl DialogueTurn {
    pub fn expert(
        round: usize,
        expert_id: impl Into<String>,
        statement: impl Into<String>,
        cited_evidence: Vec<String>,
    ) -> Self {
        Self {
            round,
            speaker: Speaker::Expert(expert_id.into()),
            statement: statement.into(),
            cited_evidence,
        }
    }

    pub fn moderator(round: usize, statement: impl Into<String>) -> Self {
        Self {
            round,
            speaker: Speaker::Moderator,
            statement: statement.into(),
            cited_evidence: Vec::new(),
        }
    }

    /// View this turn as an expert-claim evidence record.
    pub fn as_claim(&self) -> EvidenceRecord {
        EvidenceRecord::new(
            EvidenceKind::ExpertClaim,
            format!("Round {}: {}", self.round + 1, self.speaker),
            self.statement.clone(),
            format!("transcript#r{}:{}", self.round + 1, self.speaker),
        )
    }
}

/// Append-only sequence of turns.
///
/// Turns cannot be modified or removed once appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<DialogueTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: DialogueTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[DialogueTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of distinct rounds that have at least one turn.
    pub fn rounds(&self) -> usize {
        self.turns.iter().map(|t| t.round + 1).max().unwrap_or(0)
    }

    /// Render the transcript as plain text for prompts.
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(|t| {
                let speaker = if t.speaker.is_moderator() {
                    "MODERATOR".to_string()
                } else {
                    t.speaker.to_string()
                };
                format!("[Round {}] {}: {}", t.round + 1, speaker, t.statement.trim())
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Result of a completed debate: the transcript and every record it cited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebateOutcome {
    pub transcript: Transcript,
    pub ledger: EvidenceLedger,
}
