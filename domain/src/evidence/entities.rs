//! Evidence entities

use crate::core::text::normalize;
use serde::{Deserialize, Serialize};

/// Where an evidence record came from.
///
/// The declaration order is the merge priority used by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    ToolServer,
    LocalRag,
    Search,
    ExpertClaim,
}

impl EvidenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceKind::ToolServer => "tool_server",
            EvidenceKind::LocalRag => "local_rag",
            EvidenceKind::Search => "search",
            EvidenceKind::ExpertClaim => "expert_claim",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            EvidenceKind::ToolServer => "tool",
            EvidenceKind::LocalRag => "rag",
            EvidenceKind::Search => "web",
            EvidenceKind::ExpertClaim => "claim",
        }
    }
}

impl std::fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// A normalized unit of evidence (Value Object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// `<kind prefix>-<12 hex digits of the content digest>`
    pub id: String,
    pub kind: EvidenceKind,
    pub title: String,
    pub snippet: String,
    /// URL, file path or tool call id
    pub locator: String,
    /// Relevance or recency hint in `0.0..=1.0`
    pub relevance: f32,
}

impl EvidenceRecord {
    pub fn new(
        kind: EvidenceKind,
        title: impl Into<String>,
        snippet: impl Into<String>,
        locator: impl Into<String>,
    ) -> Self {
        let snippet = snippet.into();
        let id = Self::derive_id(kind, &snippet);
        Self {
            id,
            kind,
            title: title.into(),
            snippet,
            locator: locator.into(),
            relevance: 0.0,
        }
    }

    pub fn with_relevance(mut self, relevance: f32) -> Self {
        self.relevance = relevance.clamp(0.0, 1.0);
        self
    }

    /// Content fingerprint used for deduplication within one gather call.
    pub fn fingerprint(&self) -> String {
        normalize(&self.snippet)
    }

    /// Text searched by relevance filters.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.snippet)
    }

    fn derive_id(kind: EvidenceKind, snippet: &str) -> String {
        let digest = blake3::hash(normalize(snippet).as_bytes()).to_hex();
        format!("{}-{}", kind.id_prefix(), &digest.as_str()[..12])
    }
}
