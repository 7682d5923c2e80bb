// Session reports
// Packages analysis results with provenance and reads/writes them as JSON files

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::gestures::{build_feedback_prompt, TagSummary, TaggedGesture};
use crate::pipeline::{AnalysisError, SessionAnalyzer};
use crate::signal::SessionInput;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Analysis worker failed: {0}")]
    Worker(String),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Everything a caller needs to present or forward one analyzed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub id: Uuid,

    /// RFC 3339 generation time
    pub generated_at: String,

    /// SHA-256 of the analyzed session re-encoded as JSON
    /// (after raw calibration, not the bytes of the source file)
    pub input_sha256: String,

    pub lane_count: usize,
    pub sample_count: usize,
    pub note_count: usize,

    pub gestures: Vec<TaggedGesture>,
    pub summary: TagSummary,

    /// Notes no press was matched to
    pub unmatched_notes: Vec<usize>,

    /// Text for the external feedback generator
    pub prompt: String,
}

impl SessionReport {
    /// Analyze `input` with `config` and build a report
    pub fn build(
        input: &SessionInput,
        lane_hint: Option<usize>,
        config: &AnalysisConfig,
    ) -> ReportResult<Self> {
        Self::build_with(&SessionAnalyzer::new(config), input, lane_hint)
    }

    /// Build a report using a prepared analyzer (e.g., one with a trace attached)
    pub fn build_with(
        analyzer: &SessionAnalyzer<'_>,
        input: &SessionInput,
        lane_hint: Option<usize>,
    ) -> ReportResult<Self> {
        let lane_count = input
            .resolve_lane_count(lane_hint)
            .map_err(AnalysisError::from)?;
        let outcome = analyzer.run(&input.force_trace, &input.expected_notes, lane_count)?;

        let summary = TagSummary::from_gestures(&outcome.gestures);
        let prompt = build_feedback_prompt(&summary);

        log::info!(
            "Analyzed session: {} gestures, {} unmatched notes",
            outcome.gestures.len(),
            outcome.unmatched_notes.len()
        );

        Ok(SessionReport {
            id: Uuid::new_v4(),
            generated_at: Utc::now().to_rfc3339(),
            input_sha256: session_sha256(input)?,
            lane_count,
            sample_count: input.force_trace.len(),
            note_count: input.expected_notes.len(),
            gestures: outcome.gestures,
            summary,
            unmatched_notes: outcome.unmatched_notes,
            prompt,
        })
    }

    /// Write the report as pretty JSON
    pub fn write_to(&self, path: &Path) -> ReportResult<()> {
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Read a report written by [`SessionReport::write_to`]
    pub fn read_from(path: &Path) -> ReportResult<Self> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }
}

/// Hex SHA-256 of `input` serialized with `serde_json::to_vec`
pub fn session_sha256(input: &SessionInput) -> ReportResult<String> {
    let bytes = serde_json::to_vec(input)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
