//! Decision log port
//!
//! Durable, append-only record of the decisions taken at each checkpoint.
//! Approved records carry the stage artifact so a rerun can resume after
//! the last approved checkpoint instead of starting over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Mutex;
use storm_domain::{DecisionKind, Stage};
use thiserror::Error;

/// Errors from the decision log
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionLogError {
    #[error("decision log I/O error: {0}")]
    Io(String),

    #[error("decision log entry {line} is corrupt: {message}")]
    Corrupt { line: usize, message: String },
}

/// One checkpoint decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub stage: Stage,
    pub kind: DecisionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// Approved stage output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

impl DecisionRecord {
    pub fn new(stage: Stage, kind: DecisionKind) -> Self {
        Self {
            stage,
            kind,
            feedback: None,
            artifact: None,
            timestamp: Utc::now(),
        }
    }

    pub fn approved(stage: Stage, artifact: Value) -> Self {
        Self::new(stage, DecisionKind::Approve).with_artifact(artifact)
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    pub fn with_artifact(mut self, artifact: Value) -> Self {
        self.artifact = Some(artifact);
        self
    }
}

/// Append-only decision storage.
///
/// Single writer: only the checkpoint orchestrator appends.
pub trait DecisionLog: Send + Sync {
    fn append(&self, record: &DecisionRecord) -> Result<(), DecisionLogError>;

    /// All records in append order.
    fn load(&self) -> Result<Vec<DecisionRecord>, DecisionLogError>;
}

/// Decision log kept in memory, for tests and one-shot runs.
#[derive(Default)]
pub struct InMemoryDecisionLog {
    records: Mutex<Vec<DecisionRecord>>,
}

impl InMemoryDecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<DecisionRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub fn snapshot(&self) -> Vec<DecisionRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl DecisionLog for InMemoryDecisionLog {
    fn append(&self, record: &DecisionRecord) -> Result<(), DecisionLogError> {
        self.records
            .lock()
            .map_err(|e| DecisionLogError::Io(e.to_string()))?
            .push(record.clone());
        Ok(())
    }

    fn load(&self) -> Result<Vec<DecisionRecord>, DecisionLogError> {
        Ok(self.snapshot())
    }
}
