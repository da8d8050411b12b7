//! Resilient clients
//!
//! Retry and health-probe logic for the completion backend and the tool
//! server. Both go through the same [`retry_with_backoff`] wrapper, so the
//! backoff schedule in [`RetryPolicy`](crate::config::RetryPolicy) is the
//! only place delays are computed.

pub mod backend;
pub mod retry;
pub mod tool_server;

pub use backend::ResilientBackend;
pub use retry::{RetryFailure, retry_with_backoff};
pub use tool_server::ToolServerClient;
