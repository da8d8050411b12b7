//! Document output

use std::fs;
use std::io;
use std::path::Path;
use storm_domain::Document;
use tracing::info;

/// Render `document` as Markdown and write it to `path`.
///
/// Parent directories are created as needed; an existing file is replaced.
pub fn write_document(path: &Path, document: &Document) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, document.render_markdown())?;
    info!(
        "Wrote {} sections and {} references to {}",
        document.sections.len(),
        document.references.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storm_domain::{DraftSection, EvidenceKind, EvidenceRecord};

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/draft.md");
        let record = EvidenceRecord::new(
            EvidenceKind::LocalRag,
            "notes.md (paragraph 1)",
            "Quantum entanglement is a resource.",
            "notes.md#0",
        );
        let document = Document::assemble(
            "Entanglement survey",
            vec![DraftSection::new("Introduction", "Text.", vec![record.id.clone()])],
            &[record],
        );

        write_document(&path, &document).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Entanglement survey"));
        assert!(written.contains("## Introduction"));
        assert!(written.contains("notes.md#0"));
    }
}
