//! Completion backend adapters
//!
//! [`HttpCompletionTransport`] speaks either the Ollama chat API or the
//! OpenAI-compatible chat completions API served by vLLM. It performs one
//! attempt per call; retries are added by
//! [`ResilientBackend`](storm_application::ResilientBackend).

mod http;

pub use http::{HttpCompletionTransport, extract_content, request_body};
