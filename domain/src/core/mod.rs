//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] - domain-level errors
//! - [`message::ChatMessage`] - role-tagged chat messages sent to a backend
//! - [`text`] - normalization, keyword extraction and truncation helpers

pub mod error;
pub mod message;
pub mod text;
