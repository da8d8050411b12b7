//! Local reference corpus
//!
//! Ingested once at startup and shared immutably by the evidence aggregator.

mod local_index;

pub use local_index::{CorpusChunk, LocalReferenceIndex, SUPPORTED_EXTENSIONS};
