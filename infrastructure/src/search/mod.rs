//! Web search adapter (Tavily)
//!
//! Without an API key the client runs in degraded mode: every search returns
//! an empty list and the condition is logged once.

use crate::http::{classify, read_json};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, Ordering};
use storm_application::config::SearchSettings;
use storm_application::{SearchPort, SourceError};
use storm_domain::{EvidenceKind, EvidenceRecord};
use tracing::{debug, warn};

/// Environment variable consulted when the config has no key.
pub const TAVILY_API_KEY_ENV: &str = "TAVILY_API_KEY";

/// Search client for the Tavily HTTP API.
#[derive(Debug)]
pub struct TavilySearchClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    max_results: usize,
    degraded_logged: AtomicBool,
}

impl TavilySearchClient {
    /// Build a client; the key falls back to `TAVILY_API_KEY`.
    pub fn new(settings: &SearchSettings) -> Result<Self, reqwest::Error> {
        let api_key = settings
            .api_key
            .clone()
            .or_else(|| std::env::var(TAVILY_API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty());
        Self::with_key(settings, api_key)
    }

    /// Build a client with exactly the given key (no env fallback).
    pub fn with_key(settings: &SearchSettings, api_key: Option<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key,
            max_results: settings.max_results,
            degraded_logged: AtomicBool::new(false),
        })
    }

    /// Whether searches are skipped for lack of a credential.
    pub fn is_degraded(&self) -> bool {
        self.api_key.is_none()
    }
}

#[async_trait]
impl SearchPort for TavilySearchClient {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<EvidenceRecord>, SourceError> {
        let Some(api_key) = &self.api_key else {
            if !self.degraded_logged.swap(true, Ordering::Relaxed) {
                warn!("No search API key configured; web search is disabled for this run");
            }
            return Ok(Vec::new());
        };

        let limit = top_k.min(self.max_results);
        if limit == 0 {
            return Ok(Vec::new());
        }

        debug!("Searching the web for '{}' (max {})", query, limit);
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-Key", api_key)
            .json(&json!({ "query": query, "max_results": limit }))
            .send()
            .await
            .map_err(|e| SourceError::Request(classify(e).to_string()))?;
        let payload = read_json(response)
            .await
            .map_err(|e| SourceError::Response(e.to_string()))?;

        Ok(parse_results(&payload, limit))
    }
}

/// Convert a Tavily response body into search evidence.
///
/// Results without content are skipped.
pub fn parse_results(payload: &Value, limit: usize) -> Vec<EvidenceRecord> {
    let Some(results) = payload.get("results").and_then(Value::as_array) else {
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|item| {
            let content = item.get("content").and_then(Value::as_str)?.trim();
            if content.is_empty() {
                return None;
            }
            let title = item
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("untitled");
            let url = item.get("url").and_then(Value::as_str).unwrap_or_default();
            let mut record = EvidenceRecord::new(EvidenceKind::Search, title, content, url);
            if let Some(score) = item.get("score").and_then(Value::as_f64) {
                record = record.with_relevance(score as f32);
            }
            Some(record)
        })
        .take(limit)
        .collect()
}
