//! Gather Evidence use case
//!
//! Fans one topic out to every evidence source concurrently and merges what
//! comes back. Each source is guarded on its own: an error, a timeout or a
//! panic in one source contributes nothing and never fails the call.

use crate::ports::evidence::{ReferenceIndexPort, SearchPort};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::resilience::ToolServerClient;
use std::sync::Arc;
use std::time::Duration;
use storm_domain::{EvidenceKind, EvidenceRecord, merge_by_priority};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatherError {
    #[error("evidence gathering cancelled")]
    Cancelled,
}

/// The evidence sources a pipeline run fans out to
#[derive(Clone)]
pub struct EvidenceSources {
    pub search: Arc<dyn SearchPort>,
    pub reference: Arc<dyn ReferenceIndexPort>,
    /// Absent when the pipeline runs without a tool server
    pub tool_server: Option<Arc<ToolServerClient>>,
}

/// Use case for gathering evidence on a topic
#[derive(Clone)]
pub struct GatherEvidenceUseCase {
    sources: EvidenceSources,
    top_k: usize,
    source_timeout: Duration,
}

impl GatherEvidenceUseCase {
    pub fn new(sources: EvidenceSources, top_k: usize, source_timeout: Duration) -> Self {
        Self {
            sources,
            top_k,
            source_timeout,
        }
    }

    /// Gather with default (no-op) progress
    pub async fn gather(
        &self,
        topic: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<EvidenceRecord>, GatherError> {
        self.gather_with_progress(topic, cancel, &NoProgress).await
    }

    /// Gather evidence for `topic`.
    ///
    /// Returns only after every source task finished or was abandoned.
    /// Records are ordered tool server, local index, search; records whose
    /// fingerprint was already seen in this call are dropped.
    pub async fn gather_with_progress(
        &self,
        topic: &str,
        cancel: &CancellationToken,
        progress: &dyn ProgressNotifier,
    ) -> Result<Vec<EvidenceRecord>, GatherError> {
        if cancel.is_cancelled() {
            return Err(GatherError::Cancelled);
        }

        let mut join_set = JoinSet::new();
        let limit = self.source_timeout;
        let top_k = self.top_k;

        if let Some(client) = &self.sources.tool_server {
            let client = Arc::clone(client);
            let topic = topic.to_string();
            join_set.spawn(guarded(EvidenceKind::ToolServer, limit, async move {
                client.lookup(&topic, top_k).await.map_err(|e| e.to_string())
            }));
        }

        {
            let reference = Arc::clone(&self.sources.reference);
            let topic = topic.to_string();
            join_set.spawn(guarded(EvidenceKind::LocalRag, limit, async move {
                Ok(reference.query(&topic, top_k))
            }));
        }

        {
            let search = Arc::clone(&self.sources.search);
            let topic = topic.to_string();
            join_set.spawn(guarded(EvidenceKind::Search, limit, async move {
                search.search(&topic, top_k).await.map_err(|e| e.to_string())
            }));
        }

        let mut batches: Vec<(EvidenceKind, Vec<EvidenceRecord>)> = Vec::new();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Evidence gathering for '{}' cancelled", topic);
                    join_set.abort_all();
                    return Err(GatherError::Cancelled);
                }
                next = join_set.join_next() => match next {
                    Some(Ok(batch)) => batches.push(batch),
                    Some(Err(e)) => warn!("Evidence source task failed: {}", e),
                    None => break,
                },
            }
        }

        batches.sort_by_key(|(kind, _)| *kind);
        let merged = merge_by_priority(batches.into_iter().map(|(_, records)| records).collect());

        debug!("Gathered {} evidence records for '{}'", merged.len(), topic);
        progress.on_evidence_gathered(topic, merged.len());
        Ok(merged)
    }
}

/// Run one source with a timeout; failures become an empty batch.
async fn guarded<F>(kind: EvidenceKind, limit: Duration, source: F) -> (EvidenceKind, Vec<EvidenceRecord>)
where
    F: std::future::Future<Output = Result<Vec<EvidenceRecord>, String>>,
{
    match tokio::time::timeout(limit, source).await {
        Ok(Ok(records)) => {
            debug!("{} returned {} records", kind, records.len());
            (kind, records)
        }
        Ok(Err(e)) => {
            warn!("{} source failed: {}", kind, e);
            (kind, Vec::new())
        }
        Err(_) => {
            warn!("{} source timed out after {:?}", kind, limit);
            (kind, Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::ports::evidence::SourceError;
    use crate::ports::tool_server::{ToolInvocation, ToolServerTransport};
    use crate::ports::transport::TransportError;
    use crate::testing::FailingSearch;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct FixedSearch(Result<Vec<EvidenceRecord>, SourceError>);

    #[async_trait]
    impl SearchPort for FixedSearch {
        async fn search(&self, _query: &str, _top_k: usize) -> Result<Vec<EvidenceRecord>, SourceError> {
            self.0.clone()
        }
    }

    struct PanickingSearch;

    #[async_trait]
    impl SearchPort for PanickingSearch {
        async fn search(&self, _query: &str, _top_k: usize) -> Result<Vec<EvidenceRecord>, SourceError> {
            panic!("search provider bug")
        }
    }

    struct HangingSearch;

    #[async_trait]
    impl SearchPort for HangingSearch {
        async fn search(&self, _query: &str, _top_k: usize) -> Result<Vec<EvidenceRecord>, SourceError> {
            std::future::pending().await
        }
    }

    struct FixedIndex(Vec<EvidenceRecord>);

    impl ReferenceIndexPort for FixedIndex {
        fn query(&self, _text: &str, top_k: usize) -> Vec<EvidenceRecord> {
            self.0.iter().take(top_k).cloned().collect()
        }
    }

    /// Tool server that is healthy but fails or answers every call as scripted.
    struct FixedToolServer(Result<Value, TransportError>);

    #[async_trait]
    impl ToolServerTransport for FixedToolServer {
        async fn probe(&self) -> Result<(), TransportError> {
            Ok(())
        }

        async fn invoke(&self, _invocation: &ToolInvocation) -> Result<Value, TransportError> {
            self.0.clone()
        }

        fn base_url(&self) -> &str {
            "http://tools.test"
        }
    }

    fn rag(snippet: &str) -> EvidenceRecord {
        EvidenceRecord::new(EvidenceKind::LocalRag, "notes.md", snippet, "corpus/notes.md")
    }

    fn web(snippet: &str) -> EvidenceRecord {
        EvidenceRecord::new(EvidenceKind::Search, "Result", snippet, "https://example.com")
    }

    async fn tool_client(result: Result<Value, TransportError>) -> Arc<ToolServerClient> {
        Arc::new(
            ToolServerClient::connect(Arc::new(FixedToolServer(result)), RetryPolicy::immediate(1))
                .await
                .unwrap(),
        )
    }

    fn use_case(sources: EvidenceSources) -> GatherEvidenceUseCase {
        GatherEvidenceUseCase::new(sources, 5, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_partial_failure_returns_local_records_only() {
        let sources = EvidenceSources {
            search: Arc::new(FailingSearch),
            reference: Arc::new(FixedIndex(vec![rag("first paragraph"), rag("second paragraph")])),
            tool_server: Some(tool_client(Err(TransportError::Connect("refused".into()))).await),
        };

        let records = use_case(sources)
            .gather("entanglement", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.kind == EvidenceKind::LocalRag));
    }

    #[tokio::test]
    async fn test_duplicate_text_across_sources_is_merged() {
        let sources = EvidenceSources {
            search: Arc::new(FixedSearch(Ok(vec![web("Quantum  Entanglement, explained!")]))),
            reference: Arc::new(FixedIndex(vec![rag("quantum entanglement explained")])),
            tool_server: None,
        };

        let records = use_case(sources)
            .gather("entanglement", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, EvidenceKind::LocalRag);
    }

    #[tokio::test]
    async fn test_priority_order_tool_local_search() {
        let sources = EvidenceSources {
            search: Arc::new(FixedSearch(Ok(vec![web("web finding")]))),
            reference: Arc::new(FixedIndex(vec![rag("local finding")])),
            tool_server: Some(
                tool_client(Ok(json!({"results": [{"title": "t", "content": "tool finding"}]}))).await,
            ),
        };

        let records = use_case(sources)
            .gather("topic", &CancellationToken::new())
            .await
            .unwrap();

        let kinds: Vec<_> = records.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![EvidenceKind::ToolServer, EvidenceKind::LocalRag, EvidenceKind::Search]
        );
    }

    #[tokio::test]
    async fn test_panicking_source_is_tolerated() {
        let sources = EvidenceSources {
            search: Arc::new(PanickingSearch),
            reference: Arc::new(FixedIndex(vec![rag("still here")])),
            tool_server: None,
        };

        let records = use_case(sources)
            .gather("topic", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_source_times_out() {
        let sources = EvidenceSources {
            search: Arc::new(HangingSearch),
            reference: Arc::new(FixedIndex(vec![rag("local")])),
            tool_server: None,
        };
        let gather = GatherEvidenceUseCase::new(sources, 5, Duration::from_millis(100));

        let records = gather.gather("topic", &CancellationToken::new()).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_fan_out() {
        let sources = EvidenceSources {
            search: Arc::new(HangingSearch),
            reference: Arc::new(FixedIndex(vec![])),
            tool_server: None,
        };
        let gather = use_case(sources);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        assert_eq!(gather.gather("topic", &cancel).await, Err(GatherError::Cancelled));
    }

    #[tokio::test]
    async fn test_separate_calls_are_independent() {
        let sources = EvidenceSources {
            search: Arc::new(FixedSearch(Ok(vec![]))),
            reference: Arc::new(FixedIndex(vec![rag("same text")])),
            tool_server: None,
        };
        let gather = use_case(sources);
        let cancel = CancellationToken::new();

        assert_eq!(gather.gather("a", &cancel).await.unwrap().len(), 1);
        assert_eq!(gather.gather("b", &cancel).await.unwrap().len(), 1);
    }
}
