//! Raw configuration data types
//!
//! These structs represent the exact structure of the YAML/TOML config file.
//! They are deserialized directly, then validated into the immutable
//! [`PipelineConfig`] snapshot.

use super::env::expand_env;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use storm_application::config::{
    BackendProvider, BackendSettings, CorpusSettings, DebateSettings, PipelineConfig, RetryPolicy,
    SearchSettings, ToolServerSettings,
};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("{0}")]
    UnknownProvider(String),

    #[error("{field} cannot be 0")]
    Zero { field: &'static str },

    #[error("backend.model cannot be empty")]
    EmptyModelName,

    #[error("{field} references an unset environment variable: {value}")]
    UnsetVariable { field: &'static str, value: String },

    #[error("backend.temperature must be within 0.0..=2.0 (got {0})")]
    InvalidTemperature(f32),

    #[error("{field} must be between 0 and {MAX_BACKOFF_SECS} seconds (got {value})")]
    InvalidBackoff { field: &'static str, value: f64 },
}

/// Upper bound for `retry_backoff` and `backoff_cap`, one day
pub const MAX_BACKOFF_SECS: f64 = 86_400.0;

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigValidationError),
}

/// Raw backend configuration (`backend:`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// "ollama" or "vllm"
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    /// Seconds
    pub request_timeout: u64,
    pub max_retries: u32,
    /// Seconds before the first retry
    pub retry_backoff: f64,
    /// Upper bound on a single backoff, in seconds
    pub backoff_cap: f64,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "gpt-oss:20b".to_string(),
            base_url: "http://localhost:11434".to_string(),
            api_key: None,
            request_timeout: 60,
            max_retries: 3,
            retry_backoff: 2.0,
            backoff_cap: 30.0,
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

/// Raw tool server configuration (`mcp:`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMcpConfig {
    pub enabled: bool,
    pub server_url: String,
    pub handshake_path: String,
    /// Shell command that starts the server when it does not answer
    pub startup_command: Option<String>,
    pub request_timeout: u64,
    pub max_retries: u32,
    pub retry_backoff: f64,
    pub backoff_cap: f64,
}

impl Default for FileMcpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            server_url: "http://localhost:8000".to_string(),
            handshake_path: "/health".to_string(),
            startup_command: None,
            request_timeout: 30,
            max_retries: 3,
            retry_backoff: 2.0,
            backoff_cap: 30.0,
        }
    }
}

/// Raw web search configuration (`tavily:`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTavilyConfig {
    pub api_key: Option<String>,
    pub max_results: usize,
    pub endpoint: String,
    pub request_timeout: u64,
}

impl Default for FileTavilyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            max_results: 5,
            endpoint: "https://api.tavily.com/search".to_string(),
            request_timeout: 20,
        }
    }
}

/// Raw local corpus configuration (`rag:`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRagConfig {
    pub directory: Option<String>,
    pub top_k: usize,
}

impl Default for FileRagConfig {
    fn default() -> Self {
        Self {
            directory: Some("./data".to_string()),
            top_k: 4,
        }
    }
}

/// Raw debate configuration (`debate:`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDebateConfig {
    pub rounds: usize,
    pub evidence_per_source: usize,
    /// Seconds each evidence source may take within one gather call
    pub source_timeout: u64,
}

impl Default for FileDebateConfig {
    fn default() -> Self {
        Self {
            rounds: 2,
            evidence_per_source: 3,
            source_timeout: 30,
        }
    }
}

/// Raw output configuration (`output:`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Markdown file written after the synthesis checkpoint
    pub path: String,
    pub decision_log: String,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            path: "draft.md".to_string(),
            decision_log: ".sci-storm/decisions.jsonl".to_string(),
        }
    }
}

/// Complete file configuration (raw structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub backend: FileBackendConfig,
    pub mcp: FileMcpConfig,
    pub tavily: FileTavilyConfig,
    pub rag: FileRagConfig,
    pub debate: FileDebateConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate and convert into the immutable pipeline snapshot.
    ///
    /// Environment references are expanded here. An unset variable in an
    /// optional credential leaves the credential unset; in a required value
    /// it is an error.
    pub fn into_pipeline_config(self) -> Result<PipelineConfig, ConfigValidationError> {
        let backend = &self.backend;
        let provider: BackendProvider = backend
            .provider
            .parse()
            .map_err(ConfigValidationError::UnknownProvider)?;
        if backend.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if !(0.0..=2.0).contains(&backend.temperature) {
            return Err(ConfigValidationError::InvalidTemperature(backend.temperature));
        }
        non_zero("backend.request_timeout", backend.request_timeout)?;
        non_zero("mcp.request_timeout", self.mcp.request_timeout)?;
        non_zero("tavily.request_timeout", self.tavily.request_timeout)?;
        non_zero("debate.rounds", self.debate.rounds as u64)?;
        non_zero("debate.source_timeout", self.debate.source_timeout)?;
        backoff("backend.retry_backoff", backend.retry_backoff)?;
        backoff("backend.backoff_cap", backend.backoff_cap)?;
        backoff("mcp.retry_backoff", self.mcp.retry_backoff)?;
        backoff("mcp.backoff_cap", self.mcp.backoff_cap)?;

        let backend_settings = BackendSettings {
            provider,
            model: backend.model.trim().to_string(),
            base_url: required("backend.base_url", &backend.base_url)?,
            api_key: optional(backend.api_key.as_deref()),
            request_timeout: Duration::from_secs(backend.request_timeout),
            temperature: backend.temperature,
            max_tokens: backend.max_tokens,
            retry: RetryPolicy::from_secs_f64(
                backend.max_retries,
                backend.retry_backoff,
                backend.backoff_cap,
            ),
        };

        let tool_server = ToolServerSettings {
            enabled: self.mcp.enabled,
            url: required("mcp.server_url", &self.mcp.server_url)?,
            health_path: self.mcp.handshake_path.clone(),
            startup_command: optional(self.mcp.startup_command.as_deref()),
            request_timeout: Duration::from_secs(self.mcp.request_timeout),
            retry: RetryPolicy::from_secs_f64(
                self.mcp.max_retries,
                self.mcp.retry_backoff,
                self.mcp.backoff_cap,
            ),
        };

        let search = SearchSettings {
            api_key: optional(self.tavily.api_key.as_deref()),
            endpoint: required("tavily.endpoint", &self.tavily.endpoint)?,
            max_results: self.tavily.max_results,
            request_timeout: Duration::from_secs(self.tavily.request_timeout),
        };

        let corpus = CorpusSettings {
            directory: match self.rag.directory.as_deref().map(str::trim) {
                Some(dir) if !dir.is_empty() => Some(PathBuf::from(required("rag.directory", dir)?)),
                _ => None,
            },
            top_k: self.rag.top_k,
        };

        let debate = DebateSettings {
            rounds: self.debate.rounds,
            evidence_per_source: self.debate.evidence_per_source,
            source_timeout: Duration::from_secs(self.debate.source_timeout),
        };

        Ok(PipelineConfig {
            backend: backend_settings,
            tool_server,
            search,
            corpus,
            debate,
            output_path: PathBuf::from(required("output.path", &self.output.path)?),
            decision_log_path: PathBuf::from(required(
                "output.decision_log",
                &self.output.decision_log,
            )?),
        })
    }
}

fn non_zero(field: &'static str, value: u64) -> Result<(), ConfigValidationError> {
    if value == 0 {
        return Err(ConfigValidationError::Zero { field });
    }
    Ok(())
}

fn backoff(field: &'static str, value: f64) -> Result<(), ConfigValidationError> {
    if !(0.0..=MAX_BACKOFF_SECS).contains(&value) {
        return Err(ConfigValidationError::InvalidBackoff { field, value });
    }
    Ok(())
}

fn required(field: &'static str, value: &str) -> Result<String, ConfigValidationError> {
    expand_env(value).ok_or_else(|| ConfigValidationError::UnsetVariable {
        field,
        value: value.to_string(),
    })
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .and_then(expand_env)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default().into_pipeline_config().unwrap();
        assert_eq!(config.backend.provider, BackendProvider::Ollama);
        assert_eq!(config.backend.retry.max_retries, 3);
        assert_eq!(config.backend.retry.base, Duration::from_secs(2));
        assert_eq!(config.tool_server.health_url(), "http://localhost:8000/health");
        assert_eq!(config.debate.rounds, 2);
        assert_eq!(config.output_path, PathBuf::from("draft.md"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut file = FileConfig::default();
        file.backend.provider = "gemini".to_string();
        assert!(matches!(
            file.into_pipeline_config(),
            Err(ConfigValidationError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let mut file = FileConfig::default();
        file.debate.rounds = 0;
        assert_eq!(
            file.into_pipeline_config(),
            Err(ConfigValidationError::Zero { field: "debate.rounds" })
        );
    }

    #[test]
    fn test_unset_credential_is_dropped() {
        let mut file = FileConfig::default();
        file.tavily.api_key = Some("${SCI_STORM_TEST_SURELY_UNSET_KEY}".to_string());
        let config = file.into_pipeline_config().unwrap();
        assert!(config.search.api_key.is_none());
    }

    #[test]
    fn test_unset_required_value_is_error() {
        let mut file = FileConfig::default();
        file.backend.base_url = "${SCI_STORM_TEST_SURELY_UNSET_HOST}".to_string();
        assert!(matches!(
            file.into_pipeline_config(),
            Err(ConfigValidationError::UnsetVariable { field: "backend.base_url", .. })
        ));
    }

    #[test]
    fn test_empty_rag_directory_disables_corpus() {
        let mut file = FileConfig::default();
        file.rag.directory = Some(" ".to_string());
        assert!(file.into_pipeline_config().unwrap().corpus.directory.is_none());
    }

    #[test]
    fn test_out_of_range_backoff_rejected() {
        let mut file = FileConfig::default();
        file.mcp.retry_backoff = 1e300;
        assert_eq!(
            file.into_pipeline_config(),
            Err(ConfigValidationError::InvalidBackoff {
                field: "mcp.retry_backoff",
                value: 1e300
            })
        );

        let mut file = FileConfig::default();
        file.backend.backoff_cap = -1.0;
        assert!(matches!(
            file.into_pipeline_config(),
            Err(ConfigValidationError::InvalidBackoff { field: "backend.backoff_cap", .. })
        ));

        let mut file = FileConfig::default();
        file.backend.retry_backoff = f64::NAN;
        assert!(file.into_pipeline_config().is_err());
    }

    #[test]
    fn test_startup_command_is_optional() {
        let config = FileConfig::default().into_pipeline_config().unwrap();
        assert!(config.tool_server.startup_command.is_none());

        let mut file = FileConfig::default();
        file.mcp.startup_command = Some("kisti-mcp serve --port 8000".to_string());
        let config = file.into_pipeline_config().unwrap();
        assert_eq!(
            config.tool_server.startup_command.as_deref(),
            Some("kisti-mcp serve --port 8000")
        );
    }
}
