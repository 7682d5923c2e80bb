// Gesture boundary extraction
// Walks outward from a matched peak to the press start/end and cuts a padded segment

use crate::signal::LaneSignals;

use super::types::GestureSegment;

/// Sample indices delimiting one press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureBounds {
    pub start: usize,
    pub peak: usize,
    pub end: usize,

    /// Inclusive padded range used for the segment
    pub segment_start: usize,
    pub segment_end: usize,
}

/// Walk back from `peak` while pressure stays above `threshold`
/// Stops at index 0 when the threshold is never crossed
pub fn press_start(values: &[f64], peak: usize, threshold: f64) -> usize {
    let mut idx = peak;
    while idx > 0 && values[idx] > threshold {
        idx -= 1;
    }
    idx
}

/// Walk forward from `peak` while pressure stays above `threshold`
/// Stops at the last index when the threshold is never crossed
pub fn press_end(values: &[f64], peak: usize, threshold: f64) -> usize {
    let last = values.len().saturating_sub(1);
    let mut idx = peak;
    while idx < last && values[idx] > threshold {
        idx += 1;
    }
    idx
}

/// Locate the press around `peak` and its padded window
pub fn find_bounds(
    values: &[f64],
    peak: usize,
    start_threshold: f64,
    end_threshold: f64,
    padding: usize,
) -> GestureBounds {
    let start = press_start(values, peak, start_threshold);
    let end = press_end(values, peak, end_threshold);
    let last = values.len().saturating_sub(1);

    GestureBounds {
        start,
        peak,
        end,
        segment_start: start.saturating_sub(padding),
        segment_end: end.saturating_add(padding).min(last),
    }
}

/// Copy the padded time/pressure window out of the lane
pub fn cut_segment(signals: &LaneSignals, lane: usize, bounds: &GestureBounds) -> GestureSegment {
    let range = bounds.segment_start..=bounds.segment_end;

    GestureSegment {
        times: signals.times[range.clone()].to_vec(),
        pressure: signals.lane(lane)[range].to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Sample;

    #[test]
    fn test_walks_to_threshold_crossings() {
        let values = [0.0, 0.05, 0.2, 0.6, 0.9, 0.5, 0.15, 0.1, 0.0];

        assert_eq!(press_start(&values, 4, 0.1), 1);
        // 0.1 is not above the threshold
        assert_eq!(press_end(&values, 4, 0.1), 7);
    }

    #[test]
    fn test_peak_at_first_index_clamps_to_zero() {
        let values = [0.9, 0.8, 0.7];
        assert_eq!(press_start(&values, 0, 0.1), 0);
    }

    #[test]
    fn test_threshold_never_crossed_reaches_bounds() {
        let values = [0.5, 0.6, 0.9, 0.6, 0.5];

        assert_eq!(press_start(&values, 2, 0.1), 0);
        assert_eq!(press_end(&values, 2, 0.1), 4);
    }

    #[test]
    fn test_peak_at_last_index_stays_put() {
        let values = [0.0, 0.3, 0.7];
        assert_eq!(press_end(&values, 2, 0.1), 2);
    }

    #[test]
    fn test_padding_is_clamped() {
        let mut values = vec![0.0; 40];
        for v in values[3..8].iter_mut() {
            *v = 0.5;
        }

        let bounds = find_bounds(&values, 5, 0.1, 0.1, 10);

        assert_eq!(bounds.start, 2);
        assert_eq!(bounds.end, 8);
        assert_eq!(bounds.segment_start, 0);
        assert_eq!(bounds.segment_end, 18);

        let near_end = find_bounds(&values[..12], 5, 0.1, 0.1, 10);
        assert_eq!(near_end.segment_end, 11);
    }

    #[test]
    fn test_cut_segment_slices_time_and_pressure() {
        let samples: Vec<Sample> = (0..30)
            .map(|i| Sample {
                time: i as f64 * 10.0,
                pressure: vec![if (12..=16).contains(&i) { 0.5 } else { 0.0 }],
            })
            .collect();
        let signals = LaneSignals::from_samples(&samples, 1).unwrap();

        let bounds = find_bounds(signals.lane(0), 14, 0.1, 0.1, 10);
        let segment = cut_segment(&signals, 0, &bounds);

        // Press spans 11..=17, padded to 1..=27
        assert_eq!(bounds.start, 11);
        assert_eq!(bounds.end, 17);
        assert_eq!(segment.len(), 27);
        assert_eq!(segment.times[0], 10.0);
        assert_eq!(segment.times[26], 270.0);
        assert_eq!(segment.pressure[13], 0.5);
    }
}
