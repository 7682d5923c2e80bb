// Force signal module
// Session ingestion, raw pressure calibration, and per-lane peak detection

pub mod calibration;
pub mod ingest;
pub mod peaks;

pub use calibration::{LaneCalibration, PressureCalibration};
pub use ingest::{validate_notes, ExpectedNote, LaneSignals, Sample, SessionInput, SignalError};
pub use peaks::{detect_lane_peaks, find_peaks, prominence, Peak, PeakCriteria};
