// Session analysis pipeline
// Loads lanes, detects peaks, matches notes, extracts gestures, and tags them

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AnalysisConfig, ConfigError};
use crate::gestures::{
    compute_features, cut_segment, find_bounds, GestureSegment, RuleTagger, TagRules,
    TaggedGesture,
};
use crate::matching::{generate_candidates, greedy_match, Assignment};
use crate::signal::{
    detect_lane_peaks, validate_notes, ExpectedNote, LaneSignals, Peak, Sample, SignalError,
};

use super::trace::{Stage, TraceEntry, TraceWriter};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid session: {0}")]
    Signal(#[from] SignalError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Gestures plus the diagnostics the plain `analyze` drops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// One per matched note, in match order (closest pairs first)
    pub gestures: Vec<TaggedGesture>,

    /// Notes no peak was assigned to, ascending
    pub unmatched_notes: Vec<usize>,

    /// Detected peaks per lane
    pub peaks_per_lane: Vec<usize>,
}

/// Analyze one session and return its tagged gestures
///
/// Notes without a usable peak are left out; only malformed input is an error.
pub fn analyze(
    samples: &[Sample],
    expected_notes: &[ExpectedNote],
    lane_count: usize,
    config: &AnalysisConfig,
) -> AnalysisResult<Vec<TaggedGesture>> {
    Ok(analyze_detailed(samples, expected_notes, lane_count, config)?.gestures)
}

/// Like [`analyze`], also reporting unmatched notes and peak counts
pub fn analyze_detailed(
    samples: &[Sample],
    expected_notes: &[ExpectedNote],
    lane_count: usize,
    config: &AnalysisConfig,
) -> AnalysisResult<AnalysisOutcome> {
    SessionAnalyzer::new(config).run(samples, expected_notes, lane_count)
}

/// Runs the pipeline with an optional progress trace
pub struct SessionAnalyzer<'a> {
    config: &'a AnalysisConfig,
    trace: Option<&'a TraceWriter>,
}

impl<'a> SessionAnalyzer<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        SessionAnalyzer {
            config,
            trace: None,
        }
    }

    /// Record stage progress to `writer`
    pub fn with_trace(mut self, writer: &'a TraceWriter) -> Self {
        self.trace = Some(writer);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        self.config
    }

    pub fn run(
        &self,
        samples: &[Sample],
        expected_notes: &[ExpectedNote],
        lane_count: usize,
    ) -> AnalysisResult<AnalysisOutcome> {
        let config = self.config;
        config.validate()?;

        // 1. Signal loading
        let signals = LaneSignals::from_samples(samples, lane_count)?;
        validate_notes(expected_notes, lane_count)?;
        self.record(TraceEntry::completed(
            Stage::SignalLoading,
            format!("Loaded {} samples on {} lanes", signals.len(), lane_count),
            serde_json::json!({
                "samples": signals.len(),
                "lanes": lane_count,
                "notes": expected_notes.len(),
            }),
        ));

        // 2. Peak detection
        let criteria = config.peak_criteria();
        let lane_peaks: Vec<Vec<Peak>> = (0..lane_count)
            .map(|lane| detect_lane_peaks(&signals, lane, &criteria))
            .collect();
        let peaks_per_lane: Vec<usize> = lane_peaks.iter().map(Vec::len).collect();
        log::debug!("Peaks per lane: {:?}", peaks_per_lane);
        self.record(TraceEntry::completed(
            Stage::PeakDetection,
            format!("Detected {} peaks", peaks_per_lane.iter().sum::<usize>()),
            serde_json::json!({ "peaks_per_lane": peaks_per_lane }),
        ));

        // 3. Matching
        let candidates = generate_candidates(expected_notes, &lane_peaks, config.window_ms);
        let outcome = greedy_match(&candidates, expected_notes.len());
        log::debug!(
            "Matched {} of {} notes from {} candidates",
            outcome.assignments.len(),
            expected_notes.len(),
            candidates.len()
        );
        self.record(TraceEntry::completed(
            Stage::Matching,
            format!(
                "Matched {} of {} notes",
                outcome.assignments.len(),
                expected_notes.len()
            ),
            serde_json::json!({
                "candidates": candidates.len(),
                "matched": outcome.assignments.len(),
                "unmatched": outcome.unmatched_notes.len(),
            }),
        ));

        // 4. Gesture extraction
        let extracted: Vec<(Assignment, ExtractedPress)> = outcome
            .assignments
            .iter()
            .map(|a| (*a, self.extract(&signals, a)))
            .collect();
        self.record(TraceEntry::completed(
            Stage::GestureExtraction,
            format!("Extracted {} gestures", extracted.len()),
            serde_json::json!({ "gestures": extracted.len() }),
        ));

        // 5. Features and tags
        let tagger = RuleTagger::with_rules(TagRules::from_config(config));
        let valley_criteria = config.valley_criteria();
        let gestures: Vec<TaggedGesture> = extracted
            .into_iter()
            .map(|(assignment, press)| {
                let note = expected_notes[assignment.note_index];
                let features = compute_features(
                    note.time,
                    press.start_time,
                    press.end_time,
                    &press.segment.pressure,
                    &valley_criteria,
                );
                let tags = tagger.tag(&features);

                TaggedGesture {
                    note_index: assignment.note_index,
                    lane: assignment.lane,
                    note_time: note.time,
                    start_time: press.start_time,
                    peak_time: assignment.peak_time,
                    end_time: press.end_time,
                    start_index: press.start_index,
                    peak_index: assignment.peak_index,
                    end_index: press.end_index,
                    segment: press.segment,
                    features,
                    tags,
                }
            })
            .collect();
        self.record(TraceEntry::completed(
            Stage::Tagging,
            format!("Tagged {} gestures", gestures.len()),
            serde_json::json!({ "gestures": gestures.len() }),
        ));

        Ok(AnalysisOutcome {
            gestures,
            unmatched_notes: outcome.unmatched_notes,
            peaks_per_lane,
        })
    }

    fn extract(&self, signals: &LaneSignals, assignment: &Assignment) -> ExtractedPress {
        let values = signals.lane(assignment.lane);
        let bounds = find_bounds(
            values,
            assignment.peak_index,
            self.config.press_start_threshold,
            self.config.press_end_threshold,
            self.config.segment_padding,
        );

        ExtractedPress {
            start_index: bounds.start,
            end_index: bounds.end,
            start_time: signals.times[bounds.start],
            end_time: signals.times[bounds.end],
            segment: cut_segment(signals, assignment.lane, &bounds),
        }
    }

    fn record(&self, entry: TraceEntry) {
        if let Some(writer) = self.trace {
            writer.record(&entry);
        }
    }
}

struct ExtractedPress {
    start_index: usize,
    end_index: usize,
    start_time: f64,
    end_time: f64,
    segment: GestureSegment,
}
