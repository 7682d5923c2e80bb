// Force trace ingestion module
// Parses recorded sessions, validates their structure, and transposes samples into lane arrays

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::calibration::PressureCalibration;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error("lane_count must be at least 1")]
    NoLanes,

    #[error("forceTrace is empty")]
    EmptyTrace,

    #[error("forceTrace[{index}].time is not a finite number")]
    NonFiniteTime { index: usize },

    #[error("forceTrace[{index}].time went backwards ({current} ms after {previous} ms)")]
    TimeNotOrdered {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("forceTrace[{index}].pressure has {found} entries, expected {expected}")]
    LaneCountMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("forceTrace[{index}].pressure[{lane}] = {value} is outside [0, 1]")]
    PressureOutOfRange { index: usize, lane: usize, value: f64 },

    #[error("expectedNotes[{index}].time is not a finite number")]
    NonFiniteNoteTime { index: usize },

    #[error("expectedNotes[{index}].lane = {lane} is outside [0, {lane_count})")]
    NoteLaneOutOfRange {
        index: usize,
        lane: usize,
        lane_count: usize,
    },

    #[error("calibration covers {calibrated} lanes, session has {lane_count}")]
    CalibrationMismatch { calibrated: usize, lane_count: usize },

    #[error("calibration lanes[{lane}].{field} = {value} is invalid: {reason}")]
    InvalidCalibration {
        lane: usize,
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Failed to parse session: {0}")]
    Parse(String),
}

/// One time-stamped reading of every lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds from session start
    pub time: f64,

    /// Normalized pressure per lane, [0.0, 1.0]
    pub pressure: Vec<f64>,
}

/// A note the player was asked to hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedNote {
    /// Target time in milliseconds
    pub time: f64,

    /// Lane index in [0, lane_count)
    pub lane: usize,
}

/// A recorded session as exported by the game front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInput {
    pub force_trace: Vec<Sample>,

    #[serde(default)]
    pub expected_notes: Vec<ExpectedNote>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane_count: Option<usize>,
}

impl SessionInput {
    /// Parse a session from JSON bytes
    pub fn from_json_bytes(data: &[u8]) -> Result<Self, SignalError> {
        serde_json::from_slice(data).map_err(|e| SignalError::Parse(e.to_string()))
    }

    /// Resolve the lane count: explicit field, then caller hint, then first sample width
    pub fn resolve_lane_count(&self, hint: Option<usize>) -> Result<usize, SignalError> {
        let lane_count = self
            .lane_count
            .or(hint)
            .or_else(|| self.force_trace.first().map(|s| s.pressure.len()))
            .ok_or(SignalError::EmptyTrace)?;

        if lane_count == 0 {
            return Err(SignalError::NoLanes);
        }
        Ok(lane_count)
    }

    /// Convert raw sensor readings (Pa) into normalized pressure in place
    pub fn normalize_raw(&mut self, calibration: &PressureCalibration) -> Result<(), SignalError> {
        calibration.validate()?;
        for sample in self.force_trace.iter_mut() {
            if sample.pressure.len() != calibration.lane_count() {
                return Err(SignalError::CalibrationMismatch {
                    calibrated: calibration.lane_count(),
                    lane_count: sample.pressure.len(),
                });
            }
            for (lane, value) in sample.pressure.iter_mut().enumerate() {
                *value = calibration.normalize(lane, *value);
            }
        }
        Ok(())
    }
}

/// Per-lane pressure arrays on a shared time axis
#[derive(Debug, Clone, PartialEq)]
pub struct LaneSignals {
    /// Sample times in milliseconds, non-decreasing
    pub times: Vec<f64>,

    /// One pressure array per lane, each the same length as `times`
    pub lanes: Vec<Vec<f64>>,
}

impl LaneSignals {
    /// Validate samples and transpose them into lane arrays
    pub fn from_samples(samples: &[Sample], lane_count: usize) -> Result<Self, SignalError> {
        if lane_count == 0 {
            return Err(SignalError::NoLanes);
        }
        if samples.is_empty() {
            return Err(SignalError::EmptyTrace);
        }

        let mut times = Vec::with_capacity(samples.len());
        let mut lanes = vec![Vec::with_capacity(samples.len()); lane_count];

        for (index, sample) in samples.iter().enumerate() {
            if !sample.time.is_finite() {
                return Err(SignalError::NonFiniteTime { index });
            }
            if let Some(&previous) = times.last() {
                if sample.time < previous {
                    return Err(SignalError::TimeNotOrdered {
                        index,
                        previous,
                        current: sample.time,
                    });
                }
            }
            if sample.pressure.len() != lane_count {
                return Err(SignalError::LaneCountMismatch {
                    index,
                    expected: lane_count,
                    found: sample.pressure.len(),
                });
            }

            for (lane, &value) in sample.pressure.iter().enumerate() {
                // NaN fails the range check too
                if !(0.0..=1.0).contains(&value) {
                    return Err(SignalError::PressureOutOfRange { index, lane, value });
                }
                lanes[lane].push(value);
            }
            times.push(sample.time);
        }

        Ok(LaneSignals { times, lanes })
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn lane(&self, lane: usize) -> &[f64] {
        &self.lanes[lane]
    }
}

/// Check every expected note against the lane count
pub fn validate_notes(notes: &[ExpectedNote], lane_count: usize) -> Result<(), SignalError> {
    for (index, note) in notes.iter().enumerate() {
        if !note.time.is_finite() {
            return Err(SignalError::NonFiniteNoteTime { index });
        }
        if note.lane >= lane_count {
            return Err(SignalError::NoteLaneOutOfRange {
                index,
                lane: note.lane,
                lane_count,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: f64, pressure: &[f64]) -> Sample {
        Sample {
            time,
            pressure: pressure.to_vec(),
        }
    }

    #[test]
    fn test_transpose_into_lanes() {
        let samples = vec![
            sample(0.0, &[0.1, 0.2]),
            sample(10.0, &[0.3, 0.4]),
            sample(10.0, &[0.5, 0.6]),
        ];

        let signals = LaneSignals::from_samples(&samples, 2).unwrap();

        assert_eq!(signals.times, vec![0.0, 10.0, 10.0]);
        assert_eq!(signals.lane(0), &[0.1, 0.3, 0.5]);
        assert_eq!(signals.lane(1), &[0.2, 0.4, 0.6]);
        assert_eq!(signals.lane_count(), 2);
        assert_eq!(signals.len(), 3);
    }

    #[test]
    fn test_rejects_empty_trace() {
        assert_eq!(
            LaneSignals::from_samples(&[], 3),
            Err(SignalError::EmptyTrace)
        );
    }

    #[test]
    fn test_rejects_zero_lanes() {
        let samples = vec![sample(0.0, &[])];
        assert_eq!(
            LaneSignals::from_samples(&samples, 0),
            Err(SignalError::NoLanes)
        );
    }

    #[test]
    fn test_rejects_backwards_time() {
        let samples = vec![sample(0.0, &[0.0]), sample(20.0, &[0.0]), sample(15.0, &[0.0])];

        let err = LaneSignals::from_samples(&samples, 1).unwrap_err();
        assert!(matches!(err, SignalError::TimeNotOrdered { index: 2, .. }));
    }

    #[test]
    fn test_rejects_lane_mismatch() {
        let samples = vec![sample(0.0, &[0.0, 0.0, 0.0]), sample(10.0, &[0.0, 0.0])];

        let err = LaneSignals::from_samples(&samples, 3).unwrap_err();
        assert_eq!(
            err,
            SignalError::LaneCountMismatch {
                index: 1,
                expected: 3,
                found: 2
            }
        );
        assert!(err.to_string().contains("forceTrace[1].pressure"));
    }

    #[test]
    fn test_rejects_out_of_range_pressure() {
        let samples = vec![sample(0.0, &[0.5, 1.2])];

        let err = LaneSignals::from_samples(&samples, 2).unwrap_err();
        assert!(matches!(
            err,
            SignalError::PressureOutOfRange { index: 0, lane: 1, .. }
        ));
    }

    #[test]
    fn test_rejects_nan_pressure() {
        let samples = vec![sample(0.0, &[f64::NAN])];
        assert!(LaneSignals::from_samples(&samples, 1).is_err());
    }

    #[test]
    fn test_validate_notes() {
        let notes = vec![
            ExpectedNote { time: 100.0, lane: 0 },
            ExpectedNote { time: 200.0, lane: 3 },
        ];

        let err = validate_notes(&notes, 3).unwrap_err();
        assert_eq!(
            err,
            SignalError::NoteLaneOutOfRange {
                index: 1,
                lane: 3,
                lane_count: 3
            }
        );
        assert!(validate_notes(&notes[..1], 3).is_ok());
    }

    #[test]
    fn test_parse_session_json() {
        let json = br#"{
            "forceTrace": [
                { "time": 0, "pressure": [0.0, 0.1, 0.2] },
                { "time": 16.6, "pressure": [0.1, 0.2, 0.3] }
            ],
            "expectedNotes": [ { "time": 2000, "lane": 1 } ]
        }"#;

        let session = SessionInput::from_json_bytes(json).unwrap();

        assert_eq!(session.force_trace.len(), 2);
        assert_eq!(session.expected_notes[0].lane, 1);
        assert_eq!(session.lane_count, None);
        assert_eq!(session.resolve_lane_count(None).unwrap(), 3);
        assert_eq!(session.resolve_lane_count(Some(5)).unwrap(), 5);
    }

    #[test]
    fn test_parse_rejects_missing_trace() {
        let err = SessionInput::from_json_bytes(br#"{ "expectedNotes": [] }"#).unwrap_err();
        assert!(matches!(err, SignalError::Parse(_)));
    }

    #[test]
    fn test_normalize_raw_readings() {
        let mut session = SessionInput {
            force_trace: vec![sample(0.0, &[100000.0, 102500.0, 110000.0])],
            expected_notes: vec![],
            lane_count: None,
        };

        session
            .normalize_raw(&PressureCalibration::uniform(3))
            .unwrap();

        assert_eq!(session.force_trace[0].pressure, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_normalize_raw_rejects_zero_range() {
        let calibration = PressureCalibration::from_json_bytes(
            br#"{ "lanes": [ { "base_pressure": 100000.0, "pressure_range": 0.0 } ] }"#,
        )
        .unwrap();
        let mut session = SessionInput {
            force_trace: vec![sample(0.0, &[100000.0]), sample(10.0, &[103500.0])],
            expected_notes: vec![],
            lane_count: None,
        };

        let err = session.normalize_raw(&calibration).unwrap_err();

        assert!(matches!(
            err,
            SignalError::InvalidCalibration {
                lane: 0,
                field: "pressure_range",
                ..
            }
        ));
        assert!(err.to_string().contains("lanes[0].pressure_range"));
        // Readings are left untouched
        assert_eq!(session.force_trace[1].pressure, vec![103500.0]);
    }

    #[test]
    fn test_rejects_non_finite_time() {
        let samples = vec![sample(0.0, &[0.0]), sample(f64::NAN, &[0.0])];

        let err = LaneSignals::from_samples(&samples, 1).unwrap_err();
        assert_eq!(err, SignalError::NonFiniteTime { index: 1 });
    }

    #[test]
    fn test_rejects_non_finite_note_time() {
        let notes = vec![
            ExpectedNote { time: 100.0, lane: 0 },
            ExpectedNote { time: f64::INFINITY, lane: 0 },
        ];

        let err = validate_notes(&notes, 1).unwrap_err();
        assert_eq!(err, SignalError::NonFiniteNoteTime { index: 1 });
        assert!(err.to_string().contains("expectedNotes[1].time"));
    }
}
