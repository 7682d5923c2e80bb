// Gesture feature extraction
// Timing offsets, duration, and force statistics for one matched press

use crate::signal::{find_peaks, PeakCriteria};

use super::types::GestureFeatures;

/// Compute features for a press
///
/// Times are in milliseconds; the timing features come out in seconds.
/// Force statistics and valleys are taken over the padded segment.
pub fn compute_features(
    note_time: f64,
    start_time: f64,
    end_time: f64,
    segment_pressure: &[f64],
    valley_criteria: &PeakCriteria,
) -> GestureFeatures {
    let (_, std_force) = mean_and_std(segment_pressure);

    GestureFeatures {
        time_offset: (start_time - note_time) / 1000.0,
        duration: (end_time - start_time) / 1000.0,
        max_force: max_value(segment_pressure),
        std_force,
        num_valleys: count_valleys(segment_pressure, valley_criteria),
    }
}

/// Local minima of the segment, found as peaks of the negated signal
pub fn count_valleys(pressure: &[f64], criteria: &PeakCriteria) -> usize {
    let negated: Vec<f64> = pressure.iter().map(|v| -v).collect();
    find_peaks(&negated, criteria).len()
}

fn max_value(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b))
}

/// Mean and population standard deviation
fn mean_and_std(data: &[f64]) -> (f64, f64) {
    if data.is_empty() {
        return (0.0, 0.0);
    }

    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

    (mean, variance.sqrt())
}
