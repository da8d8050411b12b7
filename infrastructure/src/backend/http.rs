//! HTTP transport for Ollama and vLLM chat endpoints.

use crate::http::{classify, read_json};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use storm_application::config::{BackendProvider, BackendSettings};
use storm_application::{CompletionOptions, CompletionTransport, TransportError};
use storm_domain::ChatMessage;
use tracing::debug;

/// One-attempt chat transport for a fixed provider.
#[derive(Debug, Clone)]
pub struct HttpCompletionTransport {
    client: reqwest::Client,
    provider: BackendProvider,
    model: String,
    base_url: String,
    api_key: Option<String>,
}

impl HttpCompletionTransport {
    /// Build a transport whose requests are bounded by `request_timeout`.
    pub fn new(settings: &BackendSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            provider: settings.provider,
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    /// Chat endpoint of the configured provider.
    pub fn endpoint(&self) -> String {
        match self.provider {
            BackendProvider::Ollama => format!("{}/api/chat", self.base_url),
            BackendProvider::Vllm => format!("{}/v1/chat/completions", self.base_url),
        }
    }
}

#[async_trait]
impl CompletionTransport for HttpCompletionTransport {
    async fn send_once(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, TransportError> {
        let body = request_body(self.provider, &self.model, messages, options);
        let url = self.endpoint();
        debug!("POST {} ({} messages)", url, messages.len());

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await.map_err(classify)?;
        let payload = read_json(response).await?;
        extract_content(self.provider, &payload)
    }

    fn provider(&self) -> BackendProvider {
        self.provider
    }
}

/// Request payload for one chat call.
pub fn request_body(
    provider: BackendProvider,
    model: &str,
    messages: &[ChatMessage],
    options: &CompletionOptions,
) -> Value {
    let mut body = json!({
        "model": model,
        "messages": messages,
        "stream": false,
    });

    match provider {
        BackendProvider::Ollama => {
            let mut ollama_options = Map::new();
            if let Some(temperature) = options.temperature {
                ollama_options.insert("temperature".into(), json!(temperature));
            }
            if let Some(max_tokens) = options.max_tokens {
                ollama_options.insert("num_predict".into(), json!(max_tokens));
            }
            if !ollama_options.is_empty() {
                body["options"] = Value::Object(ollama_options);
            }
        }
        BackendProvider::Vllm => {
            if let Some(temperature) = options.temperature {
                body["temperature"] = json!(temperature);
            }
            if let Some(max_tokens) = options.max_tokens {
                body["max_tokens"] = json!(max_tokens);
            }
        }
    }
    body
}

/// Pull the generated text out of a provider response.
///
/// An empty string produced by the model is returned as-is; a missing field
/// is a decode error.
pub fn extract_content(provider: BackendProvider, payload: &Value) -> Result<String, TransportError> {
    let content = match provider {
        BackendProvider::Ollama => payload.pointer("/message/content"),
        BackendProvider::Vllm => payload.pointer("/choices/0/message/content"),
    };
    content
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            TransportError::Decode(format!("{} response has no message content", provider))
        })
}
