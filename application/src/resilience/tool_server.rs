//! Tool-server client with a startup health probe.
//!
//! A [`ToolServerClient`] only exists once the server has answered a health
//! probe, so no capability can ever be invoked against a server that never
//! came up. A [`ServerLauncher`] may start the server once when the first
//! probes fail.

use super::retry::{RetryFailure, retry_with_backoff};
use crate::config::RetryPolicy;
use crate::ports::tool_server::{
    ServerLauncher, ToolInvocation, ToolServerError, ToolServerTransport,
};
use crate::ports::transport::TransportError;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use storm_domain::{EvidenceKind, EvidenceRecord};
use tracing::{debug, info, warn};

/// Capability used for evidence lookups
pub const SEARCH_CAPABILITY: &str = "search";
/// Capability used to run code experiments
pub const EXECUTE_CAPABILITY: &str = "execute";

pub struct ToolServerClient {
    transport: Arc<dyn ToolServerTransport>,
    policy: RetryPolicy,
    call_seq: AtomicU64,
    /// Holds a server this client started for as long as the client lives
    _launched: Option<Arc<dyn ServerLauncher>>,
}

impl std::fmt::Debug for ToolServerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolServerClient")
            .field("url", &self.transport.base_url())
            .field("policy", &self.policy)
            .finish()
    }
}

impl ToolServerClient {
    /// Probe the server until it answers, at most `max(1, policy.max_retries)`
    /// times, sleeping `policy.backoff(n)` between probes.
    pub async fn connect(
        transport: Arc<dyn ToolServerTransport>,
        policy: RetryPolicy,
    ) -> Result<Self, ToolServerError> {
        Self::connect_or_launch(transport, policy, None).await
    }

    /// Like [`connect`](Self::connect), but when every probe fails and a
    /// launcher is given, start the server once and probe again with the
    /// same budget.
    pub async fn connect_or_launch(
        transport: Arc<dyn ToolServerTransport>,
        policy: RetryPolicy,
        launcher: Option<Arc<dyn ServerLauncher>>,
    ) -> Result<Self, ToolServerError> {
        let url = transport.base_url().to_string();

        let mut attempts = match Self::await_healthy(transport.as_ref(), &policy).await {
            Ok(()) => return Ok(Self::ready(transport, policy, None)),
            Err(attempts) => attempts,
        };

        if let Some(launcher) = launcher {
            warn!("Tool server {} did not answer; starting it", url);
            launcher.launch().await?;
            match Self::await_healthy(transport.as_ref(), &policy).await {
                Ok(()) => return Ok(Self::ready(transport, policy, Some(launcher))),
                Err(more) => attempts += more,
            }
        }

        Err(ToolServerError::Unreachable { url, attempts })
    }

    /// One round of health probes. On failure returns the number of probes sent.
    async fn await_healthy(transport: &dyn ToolServerTransport, policy: &RetryPolicy) -> Result<(), u32> {
        let probe_policy = RetryPolicy {
            max_retries: policy.max_retries.max(1) - 1,
            ..*policy
        };
        retry_with_backoff(&probe_policy, "tool server health probe", |_| true, |_| {
            transport.probe()
        })
        .await
        .map_err(|failure| failure.attempts())
    }

    fn ready(
        transport: Arc<dyn ToolServerTransport>,
        policy: RetryPolicy,
        launched: Option<Arc<dyn ServerLauncher>>,
    ) -> Self {
        info!("Tool server {} is healthy", transport.base_url());
        Self {
            transport,
            policy,
            call_seq: AtomicU64::new(0),
            _launched: launched,
        }
    }

    pub fn url(&self) -> &str {
        self.transport.base_url()
    }

    /// A single probe, no retries.
    pub async fn health_check(&self) -> bool {
        self.transport.probe().await.is_ok()
    }

    /// Invoke a capability once. Tool calls may have side effects, so
    /// failures are returned as-is.
    pub async fn invoke(&self, capability: &str, args: Value) -> Result<Value, ToolServerError> {
        debug!("Invoking tool capability '{}'", capability);
        self.transport
            .invoke(&ToolInvocation::new(capability, args))
            .await
            .map_err(|source| ToolServerError::Invocation {
                capability: capability.to_string(),
                source,
            })
    }

    /// Invoke a capability the server deduplicates by `token`, retrying
    /// transient failures under the client's policy.
    pub async fn invoke_idempotent(
        &self,
        capability: &str,
        args: Value,
        token: &str,
    ) -> Result<Value, ToolServerError> {
        let invocation = ToolInvocation::new(capability, args).with_idempotency_key(token);
        let label = format!("tool call '{}'", capability);

        retry_with_backoff(&self.policy, &label, TransportError::is_transient, |_| {
            self.transport.invoke(&invocation)
        })
        .await
        .map_err(|failure| match failure {
            RetryFailure::Exhausted {
                attempts,
                last_error,
            } => ToolServerError::Exhausted {
                capability: capability.to_string(),
                attempts,
                last_error: last_error.to_string(),
            },
            RetryFailure::Fatal { error, .. } => ToolServerError::Invocation {
                capability: capability.to_string(),
                source: error,
            },
        })
    }

    /// Submit a code experiment for a hypothesis. The server is probed once
    /// first, and the experiment is not sent if it does not answer.
    pub async fn run_experiment(&self, hypothesis: &str, code: &str) -> Result<Value, ToolServerError> {
        if !self.health_check().await {
            return Err(ToolServerError::Unreachable {
                url: self.url().to_string(),
                attempts: 1,
            });
        }
        self.invoke(
            EXECUTE_CAPABILITY,
            json!({ "hypothesis": hypothesis, "code": code }),
        )
        .await
    }

    /// Render an execution result as a short Markdown report.
    pub fn interpret_result(result: &Value) -> String {
        let field = |keys: &[&str]| -> String {
            keys.iter()
                .filter_map(|k| result.get(*k))
                .find(|v| !v.is_null() && v.as_str() != Some(""))
                .map(|v| match v.as_str() {
                    Some(s) => s.to_string(),
                    None => serde_json::to_string_pretty(v).unwrap_or_default(),
                })
                .unwrap_or_default()
        };

        let summary = field(&["summary"]);
        let output = field(&["stdout", "result"]);
        let logs = field(&["logs", "stderr"]);

        let mut parts = vec![
            "### Execution Summary".to_string(),
            if summary.is_empty() {
                "The tool server did not return an explicit summary.".to_string()
            } else {
                summary
            },
            String::new(),
            "### Output".to_string(),
            output,
        ];
        if !logs.is_empty() {
            parts.extend([String::new(), "### Logs".to_string(), logs]);
        }
        parts.join("\n")
    }

    /// Look up evidence for a topic through the `search` capability.
    pub async fn lookup(&self, topic: &str, top_k: usize) -> Result<Vec<EvidenceRecord>, ToolServerError> {
        let result = self
            .invoke(SEARCH_CAPABILITY, json!({ "query": topic, "top_k": top_k }))
            .await?;
        let call_id = format!(
            "{}/invoke#{}",
            self.url().trim_end_matches('/'),
            self.call_seq.fetch_add(1, Ordering::Relaxed) + 1
        );
        Ok(Self::normalize_results(&result, &call_id, top_k))
    }

    /// Turn a tool result into evidence: one record per entry of a `results`
    /// array, otherwise one record holding the interpreted report.
    pub fn normalize_results(result: &Value, call_id: &str, top_k: usize) -> Vec<EvidenceRecord> {
        if let Some(items) = result.get("results").and_then(Value::as_array) {
            return items
                .iter()
                .filter_map(|item| {
                    let snippet = ["content", "snippet", "text"]
                        .iter()
                        .find_map(|k| item.get(*k).and_then(Value::as_str))?;
                    let title = item
                        .get("title")
                        .and_then(Value::as_str)
                        .unwrap_or("tool result");
                    let locator = item
                        .get("url")
                        .or_else(|| item.get("id"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| call_id.to_string());
                    let mut record =
                        EvidenceRecord::new(EvidenceKind::ToolServer, title, snippet, locator);
                    if let Some(score) = item.get("score").and_then(Value::as_f64) {
                        record = record.with_relevance(score as f32);
                    }
                    Some(record)
                })
                .take(top_k)
                .collect();
        }

        if result.is_null() || result.as_object().is_some_and(|o| o.is_empty()) {
            return Vec::new();
        }

        vec![EvidenceRecord::new(
            EvidenceKind::ToolServer,
            "Tool server report",
            Self::interpret_result(result),
            call_id,
        )]
    }
}
