//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Roster is frozen: experts cannot be changed once the debate has started")]
    RosterFrozen,

    #[error("Roster is empty: at least one expert is required before the debate")]
    EmptyRoster,

    #[error("Expert already on the roster: {0}")]
    DuplicateExpert(String),

    #[error("Unknown expert: {0}")]
    UnknownExpert(String),

    #[error("Invalid expert: {0}")]
    InvalidExpert(String),

    #[error("Malformed outline: {0}")]
    MalformedOutline(String),

    #[error("Invalid brief: {0}")]
    InvalidBrief(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_error_display() {
        let error = DomainError::Cancelled;
        assert_eq!(error.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(DomainError::Cancelled.is_cancelled());
        assert!(!DomainError::RosterFrozen.is_cancelled());
        assert!(!DomainError::EmptyRoster.is_cancelled());
        assert!(!DomainError::MalformedOutline("no headings".to_string()).is_cancelled());
    }

    #[test]
    fn test_roster_frozen_message_mentions_debate() {
        assert!(DomainError::RosterFrozen.to_string().contains("debate"));
    }
}
