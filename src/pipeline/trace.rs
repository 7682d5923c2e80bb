// Analysis progress tracing
// Append-only JSONL trace of the stages a session passes through

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during trace operations
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SignalLoading,
    PeakDetection,
    Matching,
    GestureExtraction,
    Tagging,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::SignalLoading => "signal_loading",
            Stage::PeakDetection => "peak_detection",
            Stage::Matching => "matching",
            Stage::GestureExtraction => "gesture_extraction",
            Stage::Tagging => "tagging",
        }
    }

    /// Overall progress once this stage has finished
    pub fn completed_progress(&self) -> f32 {
        match self {
            Stage::SignalLoading => 0.2,
            Stage::PeakDetection => 0.4,
            Stage::Matching => 0.6,
            Stage::GestureExtraction => 0.8,
            Stage::Tagging => 1.0,
        }
    }
}

/// A single line of the trace file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// RFC 3339 creation time
    pub timestamp: String,

    pub stage: Stage,

    /// Overall progress [0.0, 1.0]
    pub progress: f32,

    pub message: String,

    /// Stage counters (peaks per lane, matched notes, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TraceEntry {
    pub fn new(stage: Stage, progress: f32, message: impl Into<String>) -> Self {
        TraceEntry {
            timestamp: Utc::now().to_rfc3339(),
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
            data: None,
        }
    }

    /// Entry marking `stage` as finished, with its counters
    pub fn completed(stage: Stage, message: impl Into<String>, data: serde_json::Value) -> Self {
        let mut entry = TraceEntry::new(stage, stage.completed_progress(), message);
        entry.data = Some(data);
        entry
    }

    /// Serialize to JSON line (with newline)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

/// Appends trace entries to a JSONL file
pub struct TraceWriter {
    file_path: PathBuf,
}

impl TraceWriter {
    pub fn new(file_path: PathBuf) -> Self {
        TraceWriter { file_path }
    }

    /// Append one entry, creating the file if needed
    pub fn write(&self, entry: &TraceEntry) -> Result<(), TraceError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        file.write_all(entry.to_json_line()?.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Append one entry; failures are logged and otherwise ignored
    pub fn record(&self, entry: &TraceEntry) {
        if let Err(e) = self.write(entry) {
            log::warn!(
                "Failed to write trace entry to {}: {}",
                self.file_path.display(),
                e
            );
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Read trace entries from a JSONL file
pub fn read_trace_file(path: &Path) -> Result<Vec<TraceEntry>, TraceError> {
    let contents = std::fs::read_to_string(path)?;

    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(TraceError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_progress_clamping() {
        let low = TraceEntry::new(Stage::Matching, -0.5, "low");
        assert_eq!(low.progress, 0.0);

        let high = TraceEntry::new(Stage::Matching, 1.5, "high");
        assert_eq!(high.progress, 1.0);
    }

    #[test]
    fn test_completed_entry_carries_data() {
        let entry = TraceEntry::completed(
            Stage::PeakDetection,
            "Detected 4 peaks",
            serde_json::json!({ "peaks_per_lane": [1, 3] }),
        );

        assert_eq!(entry.progress, 0.4);
        assert_eq!(entry.data.unwrap()["peaks_per_lane"][1], 3);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let line = TraceEntry::new(Stage::GestureExtraction, 0.7, "cutting")
            .to_json_line()
            .unwrap();

        assert!(line.ends_with('\n'));
        assert!(line.contains("\"stage\":\"gesture_extraction\""));
        assert!(!line.contains("\"data\""));
    }

    #[test]
    fn test_writer_appends_lines() {
        let temp_dir = TempDir::new().unwrap();
        let trace_path = temp_dir.path().join("trace.jsonl");
        let writer = TraceWriter::new(trace_path.clone());

        writer.write(&TraceEntry::new(Stage::SignalLoading, 0.0, "Start")).unwrap();
        writer.record(&TraceEntry::new(Stage::Tagging, 1.0, "Done"));

        let entries = read_trace_file(&trace_path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].stage, Stage::SignalLoading);
        assert_eq!(entries[1].stage, Stage::Tagging);
        assert_eq!(entries[1].progress, 1.0);
    }

    #[test]
    fn test_record_into_missing_directory_does_not_panic() {
        let temp_dir = TempDir::new().unwrap();
        let writer = TraceWriter::new(temp_dir.path().join("missing").join("trace.jsonl"));

        writer.record(&TraceEntry::new(Stage::Matching, 0.5, "lost"));
        assert!(!writer.path().exists());
    }
}
