//! Draft entities

use crate::evidence::EvidenceRecord;
use serde::{Deserialize, Serialize};

/// Generated text answering one outline heading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSection {
    pub heading: String,
    pub text: String,
    /// Evidence ids used to write the section, in citation order
    pub evidence_ids: Vec<String>,
}

impl DraftSection {
    pub fn new(heading: impl Into<String>, text: impl Into<String>, evidence_ids: Vec<String>) -> Self {
        Self {
            heading: heading.into(),
            text: text.into(),
            evidence_ids,
        }
    }

    pub fn cites(&self, id: &str) -> bool {
        self.evidence_ids.iter().any(|e| e == id)
    }
}

/// The finished draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub sections: Vec<DraftSection>,
    /// Every record cited by at least one section, first citation first
    #[serde(default)]
    pub references: Vec<EvidenceRecord>,
}

impl Document {
    /// Assemble a document, keeping only references some section cites.
    pub fn assemble(
        title: impl Into<String>,
        sections: Vec<DraftSection>,
        evidence: &[EvidenceRecord],
    ) -> Self {
        let mut references: Vec<EvidenceRecord> = Vec::new();
        for id in sections.iter().flat_map(|s| s.evidence_ids.iter()) {
            if references.iter().any(|r| &r.id == id) {
                continue;
            }
            if let Some(record) = evidence.iter().find(|r| &r.id == id) {
                references.push(record.clone());
            }
        }
        Self {
            title: title.into(),
            sections,
            references,
        }
    }

    /// Concatenate the sections in outline order as Markdown.
    pub fn render_markdown(&self) -> String {
        let mut out = format!("# {}\n", self.title.trim());

        for section in &self.sections {
            out.push_str(&format!("\n## {}\n\n{}\n", section.heading, section.text.trim()));
            if !section.evidence_ids.is_empty() {
                out.push_str(&format!("\n_Evidence: {}_\n", section.evidence_ids.join(", ")));
            }
        }

        if !self.references.is_empty() {
            out.push_str("\n## References\n\n");
            for record in &self.references {
                out.push_str(&format!(
                    "- [{}] {} ({}): {}\n",
                    record.id, record.title, record.kind, record.locator
                ));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::EvidenceKind;

    #[test]
    fn test_render_sections_in_order_with_references() {
        let rag = EvidenceRecord::new(EvidenceKind::LocalRag, "notes.md", "Entangled photons", "corpus/notes.md");
        let unused = EvidenceRecord::new(EvidenceKind::Search, "Blog", "Unrelated", "https://example.com");
        let sections = vec![
            DraftSection::new("Introduction", "Intro text.", vec![rag.id.clone()]),
            DraftSection::new("Methods", "Methods text.", vec![]),
        ];
        let doc = Document::assemble("Quantum Draft", sections, &[rag.clone(), unused]);

        assert_eq!(doc.references.len(), 1);
        let md = doc.render_markdown();
        assert!(md.starts_with("# Quantum Draft\n"));
        let intro = md.find("## Introduction").unwrap();
        let methods = md.find("## Methods").unwrap();
        assert!(intro < methods);
        assert!(md.contains("## References"));
        assert!(md.contains(&format!("[{}] notes.md (LOCAL_RAG): corpus/notes.md", rag.id)));
        assert!(!md.contains("example.com"));
    }

    #[test]
    fn test_cites() {
        let section = DraftSection::new("Results", "text", vec!["rag-abc".to_string()]);
        assert!(section.cites("rag-abc"));
        assert!(!section.cites("web-abc"));
    }
}
