//! Roster entities

use crate::core::error::DomainError;
use crate::core::text::slugify;
use serde::{Deserialize, Serialize};

/// Reserved speaker id for human interjections in the transcript.
pub const MODERATOR_ID: &str = "moderator";

/// A simulated expert on the panel (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertProfile {
    /// Unique id within a roster
    pub id: String,
    pub name: String,
    /// What the expert knows; also the focus used to key evidence searches
    pub expertise: String,
    /// Stance or bias hint injected into the expert's prompts
    #[serde(default)]
    pub stance: String,
    /// Persona instructions
    #[serde(default)]
    pub system_prompt: String,
}

impl ExpertProfile {
    /// Create an expert whose id is derived from its name.
    pub fn new(name: impl Into<String>, expertise: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: slugify(&name),
            name,
            expertise: expertise.into(),
            stance: String::new(),
            system_prompt: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_stance(mut self, stance: impl Into<String>) -> Self {
        self.stance = stance.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Focus string used for evidence queries and outline hooks.
    pub fn focus(&self) -> &str {
        if self.expertise.trim().is_empty() {
            &self.name
        } else {
            &self.expertise
        }
    }

    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        if self.id.trim().is_empty() {
            return Err(DomainError::InvalidExpert("id cannot be empty".to_string()));
        }
        if self.id == MODERATOR_ID {
            return Err(DomainError::InvalidExpert(format!(
                "'{}' is reserved for the human moderator",
                MODERATOR_ID
            )));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidExpert(format!(
                "expert '{}' has no name",
                self.id
            )));
        }
        Ok(())
    }
}

/// Partial update applied by [`RosterManager::edit`](super::RosterManager::edit).
///
/// `None` fields are left unchanged. The id is immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl ExpertPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.expertise.is_none()
            && self.stance.is_none()
            && self.system_prompt.is_none()
    }

    pub(crate) fn apply(&self, profile: &mut ExpertProfile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(expertise) = &self.expertise {
            profile.expertise = expertise.clone();
        }
        if let Some(stance) = &self.stance {
            profile.stance = stance.clone();
        }
        if let Some(prompt) = &self.system_prompt {
            profile.system_prompt = prompt.clone();
        }
    }
}

/// One human-directed roster change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum RosterEdit {
    Add { profile: ExpertProfile },
    Remove { id: String },
    Edit { id: String, patch: ExpertPatch },
}
