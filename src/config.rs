// Analysis configuration
// Tunable thresholds for peak picking, matching, gesture boundaries, and tagging

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::signal::PeakCriteria;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Every threshold the analysis reads, grouped by pipeline stage
///
/// Missing fields in a config file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // --- Matching ---
    /// Largest note-to-peak distance that can still match (ms)
    pub window_ms: f64,

    // --- Peak detection ---
    pub min_peak_height: f64,
    pub min_prominence: f64,
    /// Minimum spacing between peaks, in samples
    pub min_distance: usize,

    // --- Gesture boundaries ---
    pub press_start_threshold: f64,
    pub press_end_threshold: f64,
    /// Samples of context kept on each side of a gesture
    pub segment_padding: usize,

    // --- Jitter detection ---
    pub valley_min_distance: usize,
    pub valley_min_prominence: f64,

    // --- Tagging (seconds / normalized force) ---
    pub delay_threshold: f64,
    pub early_threshold: f64,
    pub short_threshold: f64,
    pub long_threshold: f64,
    pub weak_threshold: f64,
    pub strong_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            window_ms: 1000.0,
            min_peak_height: 0.1,
            min_prominence: 0.05,
            min_distance: 3,
            press_start_threshold: 0.1,
            press_end_threshold: 0.1,
            segment_padding: 10,
            valley_min_distance: 3,
            valley_min_prominence: 0.01,
            delay_threshold: 0.8,
            early_threshold: -0.7,
            short_threshold: 0.3,
            long_threshold: 0.8,
            weak_threshold: 0.3,
            strong_threshold: 0.9,
        }
    }
}

impl AnalysisConfig {
    /// Criteria for detecting presses on a lane
    pub fn peak_criteria(&self) -> PeakCriteria {
        PeakCriteria {
            min_height: Some(self.min_peak_height),
            min_prominence: self.min_prominence,
            min_distance: self.min_distance,
        }
    }

    /// Criteria for detecting dips inside a gesture (applied to the negated segment)
    pub fn valley_criteria(&self) -> PeakCriteria {
        PeakCriteria {
            min_height: None,
            min_prominence: self.valley_min_prominence,
            min_distance: self.valley_min_distance,
        }
    }

    /// Reject values that would make the analysis meaningless
    pub fn validate(&self) -> ConfigResult<()> {
        let finite = [
            ("window_ms", self.window_ms),
            ("min_peak_height", self.min_peak_height),
            ("min_prominence", self.min_prominence),
            ("press_start_threshold", self.press_start_threshold),
            ("press_end_threshold", self.press_end_threshold),
            ("valley_min_prominence", self.valley_min_prominence),
            ("delay_threshold", self.delay_threshold),
            ("early_threshold", self.early_threshold),
            ("short_threshold", self.short_threshold),
            ("long_threshold", self.long_threshold),
            ("weak_threshold", self.weak_threshold),
            ("strong_threshold", self.strong_threshold),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(invalid(field, "must be a finite number"));
            }
        }

        if self.window_ms < 0.0 {
            return Err(invalid("window_ms", "must not be negative"));
        }
        if self.min_distance == 0 {
            return Err(invalid("min_distance", "must be at least 1"));
        }
        if self.valley_min_distance == 0 {
            return Err(invalid("valley_min_distance", "must be at least 1"));
        }
        if self.early_threshold >= self.delay_threshold {
            return Err(invalid("early_threshold", "must be below delay_threshold"));
        }
        if self.short_threshold >= self.long_threshold {
            return Err(invalid("short_threshold", "must be below long_threshold"));
        }
        if self.weak_threshold >= self.strong_threshold {
            return Err(invalid("weak_threshold", "must be below strong_threshold"));
        }

        Ok(())
    }

    /// Export configuration to JSON
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Import configuration from JSON and validate it
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file
    pub fn read(path: &Path) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Explicit path, then the per-user config file, then defaults
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            let config = Self::read(path)?;
            log::info!("Loaded analysis config from {}", path.display());
            return Ok(config);
        }

        if let Some(path) = default_config_path().filter(|p| p.is_file()) {
            let config = Self::read(&path)?;
            log::info!("Loaded analysis config from {}", path.display());
            return Ok(config);
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }
}

/// `<config_dir>/forcebeat/config.json`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("forcebeat").join("config.json"))
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_ms, 1000.0);
        assert_eq!(config.min_distance, 3);
        assert_eq!(config.segment_padding, 10);
    }

    #[test]
    fn test_peak_and_valley_criteria() {
        let config = AnalysisConfig::default();

        let peaks = config.peak_criteria();
        assert_eq!(peaks.min_height, Some(0.1));
        assert_eq!(peaks.min_prominence, 0.05);

        let valleys = config.valley_criteria();
        assert_eq!(valleys.min_height, None);
        assert_eq!(valleys.min_prominence, 0.01);
        assert_eq!(valleys.min_distance, 3);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AnalysisConfig::default();
        config.min_distance = 0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.window_ms = -5.0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.weak_threshold = 0.95;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("weak_threshold"));

        let mut config = AnalysisConfig::default();
        config.delay_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AnalysisConfig::from_json(r#"{ "window_ms": 250.0 }"#).unwrap();
        assert_eq!(config.window_ms, 250.0);
        assert_eq!(config.strong_threshold, 0.9);
    }

    #[test]
    fn test_json_rejects_invalid_config() {
        let result = AnalysisConfig::from_json(r#"{ "short_threshold": 2.0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_read_and_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        let mut config = AnalysisConfig::default();
        config.delay_threshold = 0.5;
        fs::write(&path, config.to_json().unwrap()).unwrap();

        assert_eq!(AnalysisConfig::read(&path).unwrap(), config);
        assert_eq!(AnalysisConfig::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.json");
        assert!(matches!(
            AnalysisConfig::load(Some(&path)),
            Err(ConfigError::Io(_))
        ));
    }
}
