//! Lexical index over a directory of text and Markdown files.

use glob::{Pattern, glob};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use storm_application::ReferenceIndexPort;
use storm_domain::core::text::keywords;
use storm_domain::{EvidenceKind, EvidenceRecord};
use tracing::{debug, info, warn};

/// File extensions ingested from the corpus directory.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

/// One paragraph of a corpus file.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusChunk {
    /// Path relative to the corpus root
    pub path: PathBuf,
    /// Zero-based paragraph index within the file
    pub index: usize,
    pub text: String,
    terms: BTreeSet<String>,
}

/// Deterministic lexical index (Immutable after construction)
#[derive(Debug, Clone, Default)]
pub struct LocalReferenceIndex {
    chunks: Vec<CorpusChunk>,
}

impl LocalReferenceIndex {
    /// Index with no documents; every query returns nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Ingest every supported file below `root`, in path order.
    ///
    /// A missing directory yields an empty index. Unreadable files are
    /// skipped with a warning.
    pub fn ingest(root: &Path) -> io::Result<Self> {
        if !root.exists() {
            warn!("Reference corpus {} does not exist; local index is empty", root.display());
            return Ok(Self::empty());
        }
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }

        let mut files = BTreeSet::new();
        for ext in SUPPORTED_EXTENSIONS {
            let pattern = format!("{}/**/*.{}", Pattern::escape(&root.display().to_string()), ext);
            let entries = glob(&pattern)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
            files.extend(entries.filter_map(Result::ok).filter(|p| p.is_file()));
        }

        let mut chunks = Vec::new();
        for file in &files {
            let content = match fs::read_to_string(file) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping unreadable corpus file {}: {}", file.display(), e);
                    continue;
                }
            };
            let relative = file.strip_prefix(root).unwrap_or(file).to_path_buf();
            let before = chunks.len();
            chunks.extend(
                paragraphs(&content)
                    .enumerate()
                    .map(|(index, text)| CorpusChunk::new(relative.clone(), index, text)),
            );
            debug!("Indexed {} ({} chunks)", relative.display(), chunks.len() - before);
        }

        info!(
            "Local reference index: {} files, {} chunks from {}",
            files.len(),
            chunks.len(),
            root.display()
        );
        Ok(Self { chunks })
    }

    /// Build an index from in-memory documents `(path, content)`.
    pub fn from_documents<P: Into<PathBuf>>(documents: impl IntoIterator<Item = (P, String)>) -> Self {
        let mut documents: Vec<(PathBuf, String)> =
            documents.into_iter().map(|(p, c)| (p.into(), c)).collect();
        documents.sort_by(|a, b| a.0.cmp(&b.0));

        let chunks = documents
            .iter()
            .flat_map(|(path, content)| {
                paragraphs(content)
                    .enumerate()
                    .map(|(index, text)| CorpusChunk::new(path.clone(), index, text))
                    .collect::<Vec<_>>()
            })
            .collect();
        Self { chunks }
    }

    pub fn chunks(&self) -> &[CorpusChunk] {
        &self.chunks
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl CorpusChunk {
    fn new(path: PathBuf, index: usize, text: String) -> Self {
        let terms = keywords(&text);
        Self {
            path,
            index,
            text,
            terms,
        }
    }

    /// Share of the query terms present in this chunk.
    fn score(&self, query_terms: &BTreeSet<String>) -> f32 {
        if query_terms.is_empty() {
            return 0.0;
        }
        let hits = query_terms.intersection(&self.terms).count();
        hits as f32 / query_terms.len() as f32
    }

    fn locator(&self) -> String {
        format!("{}#{}", self.path.display(), self.index)
    }

    fn to_record(&self, score: f32) -> EvidenceRecord {
        let title = match self.path.file_name() {
            Some(name) => format!("{} (paragraph {})", name.to_string_lossy(), self.index + 1),
            None => self.locator(),
        };
        EvidenceRecord::new(EvidenceKind::LocalRag, title, self.text.clone(), self.locator())
            .with_relevance(score)
    }
}

impl ReferenceIndexPort for LocalReferenceIndex {
    /// Rank chunks by lexical overlap; ties break by path then chunk index.
    fn query(&self, text: &str, top_k: usize) -> Vec<EvidenceRecord> {
        let terms = keywords(text);
        if terms.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(f32, &CorpusChunk)> = self
            .chunks
            .iter()
            .map(|chunk| (chunk.score(&terms), chunk))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|(sa, a), (sb, b)| {
            sb.total_cmp(sa)
                .then_with(|| a.path.cmp(&b.path))
                .then_with(|| a.index.cmp(&b.index))
        });

        scored
            .into_iter()
            .take(top_k)
            .map(|(score, chunk)| chunk.to_record(score))
            .collect()
    }
}

/// Non-empty paragraphs separated by blank lines.
fn paragraphs(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .split("\n\n")
        .flat_map(|block| block.split("\r\n\r\n"))
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}
