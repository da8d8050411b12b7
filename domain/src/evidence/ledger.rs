//! Merging and accumulating evidence records.

use super::entities::EvidenceRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Merge per-source batches into one evidence set.
///
/// Batches are concatenated in the order given (the caller passes them in
/// source priority order) and records whose fingerprint was already seen
/// are dropped. Records with an empty fingerprint are dropped too.
pub fn merge_by_priority(batches: Vec<Vec<EvidenceRecord>>) -> Vec<EvidenceRecord> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for record in batches.into_iter().flatten() {
        let fingerprint = record.fingerprint();
        if fingerprint.is_empty() {
            continue;
        }
        if seen.insert(fingerprint) {
            merged.push(record);
        }
    }
    merged
}

/// Insertion-ordered collection of evidence keyed by id.
///
/// Accumulates the records cited across debate turns so the synthesizer
/// can look them up. Re-inserting an id keeps the first record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceLedger {
    records: Vec<EvidenceRecord>,
}

impl EvidenceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; returns `false` if the id was already present.
    pub fn insert(&mut self, record: EvidenceRecord) -> bool {
        if self.contains(&record.id) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = EvidenceRecord>) {
        for record in records {
            self.insert(record);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&EvidenceRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> &[EvidenceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::EvidenceKind;

    fn rec(kind: EvidenceKind, text: &str) -> EvidenceRecord {
        EvidenceRecord::new(kind, text, text, "loc")
    }

    #[test]
    fn test_merge_keeps_priority_order_and_drops_duplicates() {
        let merged = merge_by_priority(vec![
            vec![rec(EvidenceKind::ToolServer, "Shared finding")],
            vec![
                rec(EvidenceKind::LocalRag, "shared finding."),
                rec(EvidenceKind::LocalRag, "Local only"),
            ],
            vec![rec(EvidenceKind::Search, "Web only")],
        ]);
        let kinds: Vec<_> = merged.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EvidenceKind::ToolServer,
                EvidenceKind::LocalRag,
                EvidenceKind::Search
            ]
        );
        assert_eq!(merged[1].snippet, "Local only");
    }

    #[test]
    fn test_merge_drops_empty_snippets() {
        let merged = merge_by_priority(vec![vec![rec(EvidenceKind::Search, " ... ")]]);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_ledger_keeps_first_insert() {
        let mut ledger = EvidenceLedger::new();
        let first = rec(EvidenceKind::Search, "same");
        let mut second = first.clone();
        second.title = "other".into();
        assert!(ledger.insert(first));
        assert!(!ledger.insert(second));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.records()[0].title, "same");
    }
}
