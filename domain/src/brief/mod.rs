//! Document brief confirmed at the style/goal checkpoint.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of document being drafted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStyle {
    Paper,
    #[default]
    Report,
    Blog,
}

impl DocumentStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStyle::Paper => "Paper",
            DocumentStyle::Report => "Report",
            DocumentStyle::Blog => "Blog",
        }
    }
}

impl std::fmt::Display for DocumentStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DocumentStyle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paper" => Ok(DocumentStyle::Paper),
            "report" => Ok(DocumentStyle::Report),
            "blog" => Ok(DocumentStyle::Blog),
            other => Err(DomainError::InvalidBrief(format!(
                "unknown document style '{}' (expected paper, report or blog)",
                other
            ))),
        }
    }
}

/// What the document is for and how it should look (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentBrief {
    /// Research goal / target question
    pub goal: String,
    pub style: DocumentStyle,
    /// Structural requirements, e.g. "IMRaD" or "bullet outline"
    pub structure: String,
    /// Output language, if not the backend's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Free-form refinements collected from feedback
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl DocumentBrief {
    pub const DEFAULT_STRUCTURE: &'static str = "IMRaD";

    /// Create a brief, rejecting an empty goal.
    pub fn new(goal: impl Into<String>) -> Result<Self, DomainError> {
        let goal = goal.into();
        if goal.trim().is_empty() {
            return Err(DomainError::InvalidBrief("goal cannot be empty".to_string()));
        }
        Ok(Self {
            goal: goal.trim().to_string(),
            style: DocumentStyle::default(),
            structure: Self::DEFAULT_STRUCTURE.to_string(),
            language: None,
            notes: Vec::new(),
        })
    }

    pub fn with_style(mut self, style: DocumentStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_structure(mut self, structure: impl Into<String>) -> Self {
        self.structure = structure.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Produce a refined brief from reviewer feedback.
    ///
    /// Lines of the form `goal: ...`, `style: ...`, `structure: ...` or
    /// `language: ...` override the matching field; every other non-empty
    /// line is kept as a note for later prompts.
    pub fn refine(&self, feedback: &str) -> Result<Self, DomainError> {
        let mut refined = self.clone();
        for line in feedback.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let Some((key, value)) = line.split_once(':') else {
                refined.notes.push(line.to_string());
                continue;
            };
            let value = value.trim();
            match key.trim().to_lowercase().as_str() {
                "goal" if !value.is_empty() => refined.goal = value.to_string(),
                "style" => refined.style = value.parse()?,
                "structure" if !value.is_empty() => refined.structure = value.to_string(),
                "language" => {
                    refined.language = (!value.is_empty()).then(|| value.to_string());
                }
                _ => refined.notes.push(line.to_string()),
            }
        }
        Ok(refined)
    }

    /// Short title used for the rendered document.
    pub fn title(&self) -> &str {
        &self.goal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_goal_rejected() {
        assert!(matches!(
            DocumentBrief::new("   "),
            Err(DomainError::InvalidBrief(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let brief = DocumentBrief::new("Entanglement-based QKD").unwrap();
        assert_eq!(brief.style, DocumentStyle::Report);
        assert_eq!(brief.structure, "IMRaD");
        assert!(brief.language.is_none());
    }

    #[test]
    fn test_refine_overrides_fields_and_keeps_notes() {
        let brief = DocumentBrief::new("Old goal").unwrap();
        let refined = brief
            .refine("style: paper\nstructure: bullet outline\nFocus on photonic platforms")
            .unwrap();
        assert_eq!(refined.goal, "Old goal");
        assert_eq!(refined.style, DocumentStyle::Paper);
        assert_eq!(refined.structure, "bullet outline");
        assert_eq!(refined.notes, vec!["Focus on photonic platforms".to_string()]);
    }

    #[test]
    fn test_refine_rejects_unknown_style() {
        let brief = DocumentBrief::new("goal").unwrap();
        assert!(brief.refine("style: poem").is_err());
    }

    #[test]
    fn test_style_parse_case_insensitive() {
        assert_eq!("BLOG".parse::<DocumentStyle>().unwrap(), DocumentStyle::Blog);
    }
}
