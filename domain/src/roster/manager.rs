//! Roster manager: human-directed add/remove/edit until the debate starts.

use super::entities::{ExpertPatch, ExpertProfile, RosterEdit};
use crate::brief::DocumentBrief;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Holds the expert panel in insertion order.
///
/// Every mutator fails with [`DomainError::RosterFrozen`] once
/// [`freeze`](Self::freeze) has been called, which happens when the
/// pipeline enters the debate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterManager {
    experts: Vec<ExpertProfile>,
    #[serde(default)]
    frozen: bool,
}

impl RosterManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from explicit profiles (e.g. a roster file).
    pub fn from_profiles(profiles: Vec<ExpertProfile>) -> Result<Self, DomainError> {
        let mut roster = Self::new();
        for profile in profiles {
            roster.add(profile)?;
        }
        Ok(roster)
    }

    /// Default three-person panel for scientific drafting.
    pub fn seed_default(_brief: &DocumentBrief) -> Self {
        let experts = vec![
            ExpertProfile::new("Literature Reviewer", "Source recent peer-reviewed findings")
                .with_stance("Trusts replicated, peer-reviewed results over preprints")
                .with_system_prompt(
                    "Act like a meticulous literature reviewer; summarize peer-reviewed \
                     evidence, key datasets, and state-of-the-art techniques.",
                ),
            ExpertProfile::new("Methodologist", "Design experiments")
                .with_stance("Questions claims that lack controls or clear metrics")
                .with_system_prompt(
                    "Outline reproducible experimental designs, controls, and evaluation \
                     metrics tailored to the research goal.",
                ),
            ExpertProfile::new("Data Engineer", "Implementation constraints")
                .with_stance("Favors approaches that are feasible with available data and compute")
                .with_system_prompt(
                    "Identify computational constraints, data preprocessing needs, and \
                     implementation pitfalls; surface code sketches when helpful.",
                ),
        ];
        Self {
            experts,
            frozen: false,
        }
    }

    pub fn experts(&self) -> &[ExpertProfile] {
        &self.experts
    }

    pub fn get(&self, id: &str) -> Option<&ExpertProfile> {
        self.experts.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.experts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experts.is_empty()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn add(&mut self, profile: ExpertProfile) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        profile.validate()?;
        if self.get(&profile.id).is_some() {
            return Err(DomainError::DuplicateExpert(profile.id));
        }
        self.experts.push(profile);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<ExpertProfile, DomainError> {
        self.ensure_mutable()?;
        let index = self
            .experts
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| DomainError::UnknownExpert(id.to_string()))?;
        Ok(self.experts.remove(index))
    }

    pub fn edit(&mut self, id: &str, patch: &ExpertPatch) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        let expert = self
            .experts
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| DomainError::UnknownExpert(id.to_string()))?;
        let mut updated = expert.clone();
        patch.apply(&mut updated);
        updated.validate()?;
        *expert = updated;
        Ok(())
    }

    /// Apply a batch of edits atomically: either all succeed or the roster
    /// is left untouched.
    pub fn apply_edits(&mut self, edits: &[RosterEdit]) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        let mut staged = self.clone();
        for edit in edits {
            match edit {
                RosterEdit::Add { profile } => staged.add(profile.clone())?,
                RosterEdit::Remove { id } => {
                    staged.remove(id)?;
                }
                RosterEdit::Edit { id, patch } => staged.edit(id, patch)?,
            }
        }
        *self = staged;
        Ok(())
    }

    /// Check the roster can enter the debate.
    pub fn ensure_ready(&self) -> Result<(), DomainError> {
        if self.experts.is_empty() {
            return Err(DomainError::EmptyRoster);
        }
        Ok(())
    }

    /// Freeze the roster for the debate. Fails on an empty roster.
    pub fn freeze(&mut self) -> Result<(), DomainError> {
        self.ensure_ready()?;
        self.frozen = true;
        Ok(())
    }

    /// Markdown description of the team, one bullet per expert.
    pub fn describe_team(&self) -> String {
        self.experts
            .iter()
            .map(|e| {
                let mut line = format!("- {} (`{}`): {}", e.name, e.id, e.focus());
                if !e.stance.is_empty() {
                    line.push_str(&format!("\n  Stance: {}", e.stance));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Focus strings the outline proposal should cover, in roster order.
    pub fn outline_hooks(&self) -> Vec<String> {
        self.experts.iter().map(|e| e.focus().to_string()).collect()
    }

    fn ensure_mutable(&self) -> Result<(), DomainError> {
        if self.frozen {
            return Err(DomainError::RosterFrozen);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief() -> DocumentBrief {
        DocumentBrief::new("Quantum entanglement distribution").unwrap()
    }

    #[test]
    fn test_seed_default_has_three_experts_in_order() {
        let roster = RosterManager::seed_default(&brief());
        let ids: Vec<_> = roster.experts().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["literature-reviewer", "methodologist", "data-engineer"]);
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut roster = RosterManager::seed_default(&brief());
        let result = roster.add(ExpertProfile::new("Methodologist", "again"));
        assert_eq!(
            result,
            Err(DomainError::DuplicateExpert("methodologist".to_string()))
        );
    }

    #[test]
    fn test_remove_unknown() {
        let mut roster = RosterManager::seed_default(&brief());
        assert_eq!(
            roster.remove("nobody"),
            Err(DomainError::UnknownExpert("nobody".to_string()))
        );
    }

    #[test]
    fn test_remove_after_freeze_is_rejected() {
        let mut roster = RosterManager::seed_default(&brief());
        roster.freeze().unwrap();
        assert_eq!(roster.remove("methodologist"), Err(DomainError::RosterFrozen));
        assert_eq!(
            roster.add(ExpertProfile::new("Ethicist", "Research ethics")),
            Err(DomainError::RosterFrozen)
        );
        assert_eq!(
            roster.edit("methodologist", &ExpertPatch::default()),
            Err(DomainError::RosterFrozen)
        );
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn test_empty_roster_cannot_freeze() {
        let mut roster = RosterManager::new();
        assert_eq!(roster.ensure_ready(), Err(DomainError::EmptyRoster));
        assert_eq!(roster.freeze(), Err(DomainError::EmptyRoster));
        assert!(!roster.is_frozen());
    }

    #[test]
    fn test_edit_updates_fields() {
        let mut roster = RosterManager::seed_default(&brief());
        roster
            .edit(
                "data-engineer",
                &ExpertPatch {
                    expertise: Some("HPC pipelines".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(roster.get("data-engineer").unwrap().focus(), "HPC pipelines");
    }

    #[test]
    fn test_apply_edits_is_atomic() {
        let mut roster = RosterManager::seed_default(&brief());
        let edits = vec![
            RosterEdit::Remove {
                id: "methodologist".into(),
            },
            RosterEdit::Remove {
                id: "missing".into(),
            },
        ];
        assert!(roster.apply_edits(&edits).is_err());
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn test_describe_team_and_hooks() {
        let roster = RosterManager::seed_default(&brief());
        assert!(roster.describe_team().contains("Literature Reviewer"));
        assert_eq!(roster.outline_hooks()[1], "Design experiments");
    }
}
