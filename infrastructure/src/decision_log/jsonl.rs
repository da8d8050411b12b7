//! JSONL file writer for checkpoint decisions.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use storm_application::{DecisionLog, DecisionLogError, DecisionRecord};
use tracing::{debug, info};

/// Append-only JSONL decision log.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Every append is flushed so a
/// crash never loses a completed checkpoint.
pub struct JsonlDecisionLog {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlDecisionLog {
    /// Open (or create) the log at `path`, keeping existing records.
    ///
    /// Creates parent directories if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecisionLogError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| io_error(path, e))?;

        debug!("Decision log opened at {}", path.display());
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Remove any previous log, then open a fresh one.
    pub fn fresh(path: impl AsRef<Path>) -> Result<Self, DecisionLogError> {
        let path = path.as_ref();
        match fs::remove_file(path) {
            Ok(()) => info!("Discarded previous decision log {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_error(path, e)),
        }
        Self::open(path)
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DecisionLog for JsonlDecisionLog {
    fn append(&self, record: &DecisionRecord) -> Result<(), DecisionLogError> {
        let line =
            serde_json::to_string(record).map_err(|e| DecisionLogError::Io(e.to_string()))?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| DecisionLogError::Io("decision log writer poisoned".to_string()))?;
        writeln!(writer, "{}", line).map_err(|e| io_error(&self.path, e))?;
        writer.flush().map_err(|e| io_error(&self.path, e))
    }

    fn load(&self) -> Result<Vec<DecisionRecord>, DecisionLogError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.path, e)),
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| io_error(&self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|e| DecisionLogError::Corrupt {
                line: index + 1,
                message: e.to_string(),
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

impl Drop for JsonlDecisionLog {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

fn io_error(path: &Path, err: std::io::Error) -> DecisionLogError {
    DecisionLogError::Io(format!("{}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storm_domain::{DecisionKind, Stage};

    #[test]
    fn test_append_then_load_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs/decisions.jsonl");
        let log = JsonlDecisionLog::open(&path).unwrap();

        log.append(&DecisionRecord::approved(Stage::StyleGoal, json!({"stage": "style_goal"})))
            .unwrap();
        log.append(
            &DecisionRecord::new(Stage::Roster, DecisionKind::RejectWithFeedback)
                .with_feedback("add an ethicist"),
        )
        .unwrap();

        let records = log.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].stage, Stage::StyleGoal);
        assert_eq!(records[0].kind, DecisionKind::Approve);
        assert_eq!(records[1].feedback.as_deref(), Some("add an ethicist"));
    }

    #[test]
    fn test_reopen_keeps_records_and_fresh_discards() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.jsonl");

        {
            let log = JsonlDecisionLog::open(&path).unwrap();
            log.append(&DecisionRecord::new(Stage::StyleGoal, DecisionKind::Abort))
                .unwrap();
        }

        let reopened = JsonlDecisionLog::open(&path).unwrap();
        assert_eq!(reopened.load().unwrap().len(), 1);
        reopened
            .append(&DecisionRecord::new(Stage::StyleGoal, DecisionKind::Abort))
            .unwrap();
        assert_eq!(reopened.load().unwrap().len(), 2);
        drop(reopened);

        let fresh = JsonlDecisionLog::fresh(&path).unwrap();
        assert!(fresh.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.jsonl");
        std::fs::write(&path, "not json\n").unwrap();

        let log = JsonlDecisionLog::open(&path).unwrap();
        assert!(matches!(
            log.load(),
            Err(DecisionLogError::Corrupt { line: 1, .. })
        ));
    }

    #[test]
    fn test_each_line_is_json_with_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.jsonl");
        let log = JsonlDecisionLog::open(&path).unwrap();
        log.append(&DecisionRecord::new(Stage::Outline, DecisionKind::Approve))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(value["stage"], "outline");
        assert_eq!(value["kind"], "approve");
        assert!(value["timestamp"].is_string());
    }
}
