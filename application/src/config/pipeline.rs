//! Pipeline configuration snapshot.

use super::retry::RetryPolicy;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Completion backend provider.
///
/// The set is closed; the provider is fixed when the backend is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendProvider {
    #[default]
    Ollama,
    /// vLLM or any OpenAI-compatible chat completions server
    Vllm,
}

impl BackendProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendProvider::Ollama => "ollama",
            BackendProvider::Vllm => "vllm",
        }
    }
}

impl std::fmt::Display for BackendProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackendProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(BackendProvider::Ollama),
            "vllm" | "openai" => Ok(BackendProvider::Vllm),
            other => Err(format!(
                "unknown backend provider '{}' (expected 'ollama' or 'vllm')",
                other
            )),
        }
    }
}

/// Completion backend settings
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSettings {
    pub provider: BackendProvider,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    /// Bound on each individual request
    pub request_timeout: Duration,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub retry: RetryPolicy,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            provider: BackendProvider::Ollama,
            model: "gpt-oss:20b".to_string(),
            base_url: "http://localhost:11434".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(60),
            temperature: 0.7,
            max_tokens: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// Remote tool server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ToolServerSettings {
    /// When false the pipeline runs without a tool server
    pub enabled: bool,
    pub url: String,
    pub health_path: String,
    /// Shell command run once when the server fails its first probes
    pub startup_command: Option<String>,
    pub request_timeout: Duration,
    /// Probe budget at connect time and retry budget for idempotent calls
    pub retry: RetryPolicy,
}

impl Default for ToolServerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "http://localhost:8000".to_string(),
            health_path: "/health".to_string(),
            startup_command: None,
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl ToolServerSettings {
    pub fn health_url(&self) -> String {
        join_url(&self.url, &self.health_path)
    }

    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.url, path)
    }
}

/// Web search settings
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Missing key puts search in degraded mode
    pub api_key: Option<String>,
    pub endpoint: String,
    pub max_results: usize,
    pub request_timeout: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.tavily.com/search".to_string(),
            max_results: 5,
            request_timeout: Duration::from_secs(20),
        }
    }
}

/// Local reference corpus settings
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusSettings {
    /// Directory ingested at startup; `None` means an empty index
    pub directory: Option<PathBuf>,
    pub top_k: usize,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            directory: Some(PathBuf::from("./data")),
            top_k: 4,
        }
    }
}

/// Debate and evidence fan-out settings
#[derive(Debug, Clone, PartialEq)]
pub struct DebateSettings {
    pub rounds: usize,
    /// `top_k` passed to each evidence source per gather call
    pub evidence_per_source: usize,
    /// Bound on each evidence source within one gather call
    pub source_timeout: Duration,
}

impl Default for DebateSettings {
    fn default() -> Self {
        Self {
            rounds: 2,
            evidence_per_source: 3,
            source_timeout: Duration::from_secs(30),
        }
    }
}

/// Immutable configuration snapshot for one pipeline run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineConfig {
    pub backend: BackendSettings,
    pub tool_server: ToolServerSettings,
    pub search: SearchSettings,
    pub corpus: CorpusSettings,
    pub debate: DebateSettings,
    pub output_path: PathBuf,
    pub decision_log_path: PathBuf,
}

impl PipelineConfig {
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_decision_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.decision_log_path = path.into();
        self
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.debate.rounds = rounds;
        self
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Ollama".parse::<BackendProvider>().unwrap(), BackendProvider::Ollama);
        assert_eq!("vllm".parse::<BackendProvider>().unwrap(), BackendProvider::Vllm);
        assert!("gemini".parse::<BackendProvider>().is_err());
    }

    #[test]
    fn test_health_url_join() {
        let settings = ToolServerSettings {
            url: "http://localhost:8000/".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.health_url(), "http://localhost:8000/health");
        assert_eq!(settings.endpoint("/invoke"), "http://localhost:8000/invoke");
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default().with_rounds(1);
        assert_eq!(config.backend.model, "gpt-oss:20b");
        assert_eq!(config.backend.temperature, 0.7);
        assert!(config.search.api_key.is_none());
        assert_eq!(config.debate.rounds, 1);
    }
}
