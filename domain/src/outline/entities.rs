//! Outline entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// One heading of the outline with its structural hints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSection {
    pub title: String,
    /// Rationale or required subsections listed under the heading
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl OutlineSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            hints: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

/// Ordered, non-empty sequence of section headings.
///
/// Outlines are only ever replaced wholesale by a new proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    sections: Vec<OutlineSection>,
    /// Format hint carried from the brief (e.g. "IMRaD")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<String>,
}

impl Outline {
    pub fn new(sections: Vec<OutlineSection>) -> Result<Self, DomainError> {
        if sections.is_empty() {
            return Err(DomainError::MalformedOutline(
                "outline has no headings".to_string(),
            ));
        }
        Ok(Self {
            sections,
            format: None,
        })
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn sections(&self) -> &[OutlineSection] {
        &self.sections
    }

    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.title.as_str())
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Render as a numbered Markdown list, the same shape the parser accepts.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for (i, section) in self.sections.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, section.title));
            for hint in &section.hints {
                out.push_str(&format!("   - {}\n", hint));
            }
        }
        out
    }
}
