//! Tool server adapter
//!
//! `GET {url}{health_path}` for probes and `POST {url}/invoke` with a
//! [`ToolInvocation`] body for capability calls. Probe scheduling and
//! retries live in [`ToolServerClient`](storm_application::ToolServerClient).

mod launcher;

pub use launcher::CommandLauncher;

use crate::http::{classify, ensure_success, read_json};
use async_trait::async_trait;
use serde_json::Value;
use storm_application::config::ToolServerSettings;
use storm_application::{ToolInvocation, ToolServerTransport, TransportError};
use tracing::debug;

/// Header carrying the idempotency token of retried calls.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Single-attempt HTTP access to the tool server.
#[derive(Debug, Clone)]
pub struct HttpToolServerTransport {
    client: reqwest::Client,
    base_url: String,
    health_url: String,
    invoke_url: String,
}

impl HttpToolServerTransport {
    pub fn new(settings: &ToolServerSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            health_url: settings.health_url(),
            invoke_url: settings.endpoint("/invoke"),
        })
    }

    pub fn health_url(&self) -> &str {
        &self.health_url
    }

    pub fn invoke_url(&self) -> &str {
        &self.invoke_url
    }
}

#[async_trait]
impl ToolServerTransport for HttpToolServerTransport {
    async fn probe(&self) -> Result<(), TransportError> {
        let response = self
            .client
            .get(&self.health_url)
            .send()
            .await
            .map_err(classify)?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn invoke(&self, invocation: &ToolInvocation) -> Result<Value, TransportError> {
        debug!("POST {} capability={}", self.invoke_url, invocation.capability);
        let mut request = self.client.post(&self.invoke_url).json(invocation);
        if let Some(key) = &invocation.idempotency_key {
            request = request.header(IDEMPOTENCY_HEADER, key);
        }
        let response = request.send().await.map_err(classify)?;
        read_json(response).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
