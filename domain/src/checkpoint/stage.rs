//! Pipeline stages

use serde::{Deserialize, Serialize};

/// A checkpoint of the drafting pipeline.
///
/// The working stages occur in a fixed total order
/// (`StyleGoal → Roster → Outline → Debate → Synthesis → Done`).
/// `Aborted` sits outside that order and can be reached from any
/// non-terminal stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    StyleGoal,
    Roster,
    Outline,
    Debate,
    Synthesis,
    Done,
    Aborted,
}

impl Stage {
    /// Ordered working stages, from the first checkpoint to completion.
    pub const ORDER: [Stage; 6] = [
        Stage::StyleGoal,
        Stage::Roster,
        Stage::Outline,
        Stage::Debate,
        Stage::Synthesis,
        Stage::Done,
    ];

    /// The stage entered after an approval at this one.
    ///
    /// Terminal stages have no successor.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::StyleGoal => Some(Stage::Roster),
            Stage::Roster => Some(Stage::Outline),
            Stage::Outline => Some(Stage::Debate),
            Stage::Debate => Some(Stage::Synthesis),
            Stage::Synthesis => Some(Stage::Done),
            Stage::Done | Stage::Aborted => None,
        }
    }

    /// The stage whose approval gates entry into this one.
    pub fn predecessor(&self) -> Option<Stage> {
        match self {
            Stage::StyleGoal | Stage::Aborted => None,
            Stage::Roster => Some(Stage::StyleGoal),
            Stage::Outline => Some(Stage::Roster),
            Stage::Debate => Some(Stage::Outline),
            Stage::Synthesis => Some(Stage::Debate),
            Stage::Done => Some(Stage::Synthesis),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Aborted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::StyleGoal => "style_goal",
            Stage::Roster => "roster",
            Stage::Outline => "outline",
            Stage::Debate => "debate",
            Stage::Synthesis => "synthesis",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::StyleGoal => "Style & Goal",
            Stage::Roster => "Expert Roster",
            Stage::Outline => "Outline",
            Stage::Debate => "Expert Debate",
            Stage::Synthesis => "Draft Synthesis",
            Stage::Done => "Done",
            Stage::Aborted => "Aborted",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_walks_the_fixed_order() {
        let mut visited = vec![Stage::StyleGoal];
        let mut current = Stage::StyleGoal;
        while let Some(next) = current.next() {
            visited.push(next);
            current = next;
        }
        assert_eq!(visited, Stage::ORDER.to_vec());
    }

    #[test]
    fn test_predecessor_is_inverse_of_next() {
        for stage in Stage::ORDER {
            if let Some(next) = stage.next() {
                assert_eq!(next.predecessor(), Some(stage));
            }
        }
    }

    #[test]
    fn test_terminal_stages() {
        assert!(Stage::Done.is_terminal());
        assert!(Stage::Aborted.is_terminal());
        assert!(!Stage::Synthesis.is_terminal());
        assert_eq!(Stage::Aborted.next(), None);
    }

    #[test]
    fn test_display_uses_upper_snake_case() {
        assert_eq!(Stage::StyleGoal.to_string(), "STYLE_GOAL");
        assert_eq!(Stage::Synthesis.to_string(), "SYNTHESIS");
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Stage::StyleGoal).unwrap(), "\"style_goal\"");
        let stage: Stage = serde_json::from_str("\"outline\"").unwrap();
        assert_eq!(stage, Stage::Outline);
    }
}
