//! Decision log persistence
//!
//! One [`DecisionRecord`](storm_application::DecisionRecord) per JSON line,
//! appended and flushed as each checkpoint is decided.

mod jsonl;

pub use jsonl::JsonlDecisionLog;
