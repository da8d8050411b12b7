//! Application-level configuration.
//!
//! [`PipelineConfig`] is the immutable snapshot the pipeline is built from.
//! It is produced once at startup by the infrastructure config loader and
//! only read afterwards.
//!
//! - [`BackendSettings`]: completion backend selection and request options
//! - [`ToolServerSettings`]: remote tool server endpoint and probe budget
//! - [`SearchSettings`]: web search credential and limits
//! - [`CorpusSettings`]: local reference corpus
//! - [`DebateSettings`]: round count and evidence fan-out limits
//! - [`RetryPolicy`]: shared retry budget and capped exponential backoff

pub mod pipeline;
pub mod retry;

pub use pipeline::{
    BackendProvider, BackendSettings, CorpusSettings, DebateSettings, PipelineConfig,
    SearchSettings, ToolServerSettings,
};
pub use retry::RetryPolicy;
