//! Evidence source ports
//!
//! Search and the local reference index, as seen by the evidence aggregator.

use async_trait::async_trait;
use storm_domain::EvidenceRecord;
use thiserror::Error;

/// Failure of one evidence source within a gather call.
///
/// The aggregator logs these and carries on without the source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected response: {0}")]
    Response(String),
}

/// Web search provider
#[async_trait]
pub trait SearchPort: Send + Sync {
    /// Ordered results, at most `top_k`.
    ///
    /// An empty list may mean "unavailable" (no credential), not "no matches".
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<EvidenceRecord>, SourceError>;
}

/// Local reference index built at startup
pub trait ReferenceIndexPort: Send + Sync {
    /// Deterministic for a fixed corpus and query.
    fn query(&self, text: &str, top_k: usize) -> Vec<EvidenceRecord>;
}

/// Search that always returns nothing (no provider configured)
pub struct NoSearch;

#[async_trait]
impl SearchPort for NoSearch {
    async fn search(&self, _query: &str, _top_k: usize) -> Result<Vec<EvidenceRecord>, SourceError> {
        Ok(Vec::new())
    }
}
