// Forcebeat - Force-trace gesture analysis for pressure-dome rhythm sessions
// Module declarations

pub mod config;
pub mod gestures;
pub mod matching;
pub mod pipeline;
pub mod report;
pub mod signal;

pub use config::{AnalysisConfig, ConfigError};
pub use gestures::{GestureFeatures, GestureSegment, Tag, TagSet, TagSummary, TaggedGesture};
pub use pipeline::{analyze, analyze_batch, analyze_detailed, AnalysisError, AnalysisOutcome};
pub use report::{ReportError, SessionReport};
pub use signal::{ExpectedNote, PressureCalibration, Sample, SessionInput, SignalError};
