//! Evidence: normalized records from heterogeneous sources.

pub mod entities;
pub mod ledger;

pub use entities::{EvidenceKind, EvidenceRecord};
pub use ledger::{EvidenceLedger, merge_by_priority};
