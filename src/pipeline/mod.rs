// Pipeline execution and monitoring module
// Runs the full force-trace-to-tagged-gestures analysis, singly or in batches

pub mod analyze;
pub mod batch;
pub mod trace;

pub use analyze::{
    analyze, analyze_detailed, AnalysisError, AnalysisOutcome, AnalysisResult, SessionAnalyzer,
};
pub use batch::analyze_batch;
pub use trace::{read_trace_file, Stage, TraceEntry, TraceError, TraceWriter};
