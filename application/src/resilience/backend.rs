//! Completion backend with timeout-aware retries.

use super::retry::{RetryFailure, retry_with_backoff};
use crate::config::{BackendProvider, RetryPolicy};
use crate::ports::completion::{
    BackendError, CompletionBackend, CompletionOptions, CompletionTransport,
};
use crate::ports::transport::TransportError;
use async_trait::async_trait;
use std::sync::Arc;
use storm_domain::ChatMessage;
use tracing::debug;

/// [`CompletionBackend`] that retries transient transport failures.
///
/// Auth failures (401/403) and other client errors are returned after the
/// first attempt. Retry exhaustion becomes [`BackendError::Unavailable`];
/// no error is ever turned into text.
pub struct ResilientBackend {
    transport: Arc<dyn CompletionTransport>,
    policy: RetryPolicy,
}

impl ResilientBackend {
    pub fn new(transport: Arc<dyn CompletionTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn map_failure(provider: BackendProvider, failure: RetryFailure<TransportError>) -> BackendError {
        match failure {
            RetryFailure::Exhausted {
                attempts,
                last_error,
            } => BackendError::Unavailable {
                provider,
                attempts,
                last_error: last_error.to_string(),
            },
            RetryFailure::Fatal { error, .. } => match error {
                TransportError::Status {
                    status: status @ (401 | 403),
                    ..
                } => BackendError::Auth { provider, status },
                TransportError::Status { status, body } => BackendError::Rejected {
                    provider,
                    status,
                    message: body,
                },
                other => BackendError::InvalidResponse {
                    provider,
                    message: other.to_string(),
                },
            },
        }
    }
}

#[async_trait]
impl CompletionBackend for ResilientBackend {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, BackendError> {
        let provider = self.transport.provider();
        let label = format!("{} completion", provider);
        debug!("Sending {} messages to {}", messages.len(), provider);

        retry_with_backoff(&self.policy, &label, TransportError::is_transient, |_| {
            self.transport.send_once(messages, options)
        })
        .await
        .map_err(|failure| Self::map_failure(provider, failure))
    }

    fn provider(&self) -> BackendProvider {
        self.transport.provider()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Transport that replays a fixed script of results, then repeats the last one.
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<String, TransportError>>>,
        last: Result<String, TransportError>,
        calls: AtomicU32,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<String, TransportError>>) -> Self {
            let last = script
                .last()
                .cloned()
                .unwrap_or_else(|| Err(TransportError::Timeout));
            Self {
                script: Mutex::new(script.into()),
                last,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionTransport for ScriptedTransport {
        async fn send_once(
            &self,
            _messages: &[ChatMessage],
            _options: &CompletionOptions,
        ) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.last.clone())
        }

        fn provider(&self) -> BackendProvider {
            BackendProvider::Ollama
        }
    }

    fn server_error() -> TransportError {
        TransportError::Status {
            status: 503,
            body: "overloaded".to_string(),
        }
    }

    async fn run(transport: Arc<ScriptedTransport>, max_retries: u32) -> Result<String, BackendError> {
        let backend = ResilientBackend::new(transport, RetryPolicy::immediate(max_retries));
        backend
            .complete(&[ChatMessage::user("hi")], &CompletionOptions::default())
            .await
    }

    #[tokio::test]
    async fn test_fails_twice_then_succeeds() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(server_error()),
            Err(TransportError::Timeout),
            Ok("draft".to_string()),
        ]));

        let text = run(transport.clone(), 3).await.unwrap();
        assert_eq!(text, "draft");
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_always_failing_is_unavailable_after_initial_plus_retries() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(TransportError::Connect(
            "connection refused".to_string(),
        ))]));

        let err = run(transport.clone(), 2).await.unwrap_err();
        assert!(err.is_unavailable());
        match err {
            BackendError::Unavailable { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_not_retried() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(TransportError::Status {
            status: 401,
            body: "bad key".to_string(),
        })]));

        let err = run(transport.clone(), 3).await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_client_error_rejected_without_retry() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(TransportError::Status {
            status: 404,
            body: "model not found".to_string(),
        })]));

        let err = run(transport.clone(), 3).await.unwrap_err();
        assert!(matches!(err, BackendError::Rejected { status: 404, .. }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_output_is_passed_through() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(String::new())]));
        assert_eq!(run(transport, 0).await.unwrap(), "");
    }
}
