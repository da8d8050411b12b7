//! Infrastructure layer for sci-storm
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: HTTP transports for the completion backend,
//! tool server and web search, the local reference index, the JSONL
//! decision log, configuration and roster file loading.

pub mod backend;
pub mod config;
pub mod decision_log;
mod http;
pub mod output;
pub mod reference;
pub mod roster;
pub mod search;
pub mod tool_server;

// Re-export commonly used types
pub use backend::HttpCompletionTransport;
pub use config::{ConfigError, ConfigLoader, ConfigValidationError, FileConfig};
pub use decision_log::JsonlDecisionLog;
pub use output::write_document;
pub use reference::LocalReferenceIndex;
pub use roster::{RosterFileError, load_roster};
pub use search::TavilySearchClient;
pub use tool_server::{CommandLauncher, HttpToolServerTransport};
