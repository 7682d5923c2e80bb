// Pressure calibration for raw dome readings
// Maps barometric sensor values (Pa) onto the normalized [0, 1] force scale

use serde::{Deserialize, Serialize};

use super::ingest::SignalError;

/// Resting pressure of an untouched dome, in Pa
pub const DEFAULT_BASE_PRESSURE: f64 = 100_000.0;

/// Pressure rise that counts as full force, in Pa
pub const DEFAULT_PRESSURE_RANGE: f64 = 5_000.0;

/// Calibration of a single lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneCalibration {
    /// Reading when the dome is released
    pub base_pressure: f64,

    /// Reading above base that maps to 1.0
    pub pressure_range: f64,
}

impl Default for LaneCalibration {
    fn default() -> Self {
        LaneCalibration {
            base_pressure: DEFAULT_BASE_PRESSURE,
            pressure_range: DEFAULT_PRESSURE_RANGE,
        }
    }
}

impl LaneCalibration {
    /// Normalize one raw reading, clamped to [0, 1]
    pub fn normalize(&self, raw: f64) -> f64 {
        if self.pressure_range <= 0.0 || !raw.is_finite() {
            return 0.0;
        }
        ((raw - self.base_pressure) / self.pressure_range).clamp(0.0, 1.0)
    }
}

/// Calibration profile covering every lane of a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureCalibration {
    /// Optional device label (e.g., "3-dome pad")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    pub lanes: Vec<LaneCalibration>,
}

impl PressureCalibration {
    /// Same default calibration on every lane
    pub fn uniform(lane_count: usize) -> Self {
        PressureCalibration {
            device: None,
            lanes: vec![LaneCalibration::default(); lane_count],
        }
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Every lane needs a finite base and a finite, positive range
    pub fn validate(&self) -> Result<(), SignalError> {
        for (lane, c) in self.lanes.iter().enumerate() {
            if !c.base_pressure.is_finite() {
                return Err(SignalError::InvalidCalibration {
                    lane,
                    field: "base_pressure",
                    value: c.base_pressure,
                    reason: "must be finite",
                });
            }
            if !c.pressure_range.is_finite() || c.pressure_range <= 0.0 {
                return Err(SignalError::InvalidCalibration {
                    lane,
                    field: "pressure_range",
                    value: c.pressure_range,
                    reason: "must be finite and greater than zero",
                });
            }
        }
        Ok(())
    }

    /// Normalize a raw reading for `lane`; unknown lanes read as released
    pub fn normalize(&self, lane: usize, raw: f64) -> f64 {
        self.lanes
            .get(lane)
            .map(|c| c.normalize(raw))
            .unwrap_or(0.0)
    }

    /// Serialize profile to JSON bytes
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Deserialize profile from JSON bytes
    pub fn from_json_bytes(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}
