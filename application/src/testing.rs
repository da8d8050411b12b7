//! Scripted ports shared by the use case tests.

use crate::config::BackendProvider;
use crate::ports::completion::{BackendError, CompletionBackend, CompletionOptions};
use crate::ports::evidence::{ReferenceIndexPort, SearchPort, SourceError};
use async_trait::async_trait;
use std::sync::Mutex;
use storm_domain::{ChatMessage, EvidenceRecord, core::text::keywords};

type Responder = dyn Fn(&[ChatMessage]) -> Result<String, BackendError> + Send + Sync;

/// Backend that answers through a closure and records every request.
pub(crate) struct ScriptedBackend {
    respond: Box<Responder>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedBackend {
    pub(crate) fn new(
        respond: impl Fn(&[ChatMessage]) -> Result<String, BackendError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with the same text.
    pub(crate) fn fixed(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Always fail as if the retry budget were exhausted.
    pub(crate) fn unavailable() -> Self {
        Self::new(|_| {
            Err(BackendError::Unavailable {
                provider: BackendProvider::Ollama,
                attempts: 3,
                last_error: "connection refused".to_string(),
            })
        })
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// User prompts of every call, in order.
    pub(crate) fn user_prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|messages| {
                messages
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default()
            })
            .collect()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<String, BackendError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        (self.respond)(messages)
    }

    fn provider(&self) -> BackendProvider {
        BackendProvider::Ollama
    }
}

/// Reference index returning records that share a keyword with the query.
pub(crate) struct KeywordIndex(pub Vec<EvidenceRecord>);

impl ReferenceIndexPort for KeywordIndex {
    fn query(&self, text: &str, top_k: usize) -> Vec<EvidenceRecord> {
        let terms = keywords(text);
        self.0
            .iter()
            .filter(|r| keywords(&r.snippet).iter().any(|k| terms.contains(k)))
            .take(top_k)
            .cloned()
            .collect()
    }
}

/// Search provider that always fails.
pub(crate) struct FailingSearch;

#[async_trait]
impl SearchPort for FailingSearch {
    async fn search(&self, _query: &str, _top_k: usize) -> Result<Vec<EvidenceRecord>, SourceError> {
        Err(SourceError::Request("search offline".to_string()))
    }
}
