// Peak detection over lane pressure arrays
// Local maxima filtered by height, minimum spacing, and prominence

use serde::{Deserialize, Serialize};

use super::ingest::LaneSignals;

/// A local pressure maximum detected on one lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub lane: usize,

    /// Sample time in milliseconds
    pub time: f64,

    /// Sample index into the lane array
    pub index: usize,

    /// Pressure at the peak
    pub value: f64,
}

/// Acceptance rules for peak picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakCriteria {
    /// Minimum peak value, `None` disables the check
    pub min_height: Option<f64>,

    /// Minimum prominence relative to the surrounding baseline
    pub min_prominence: f64,

    /// Minimum index separation between accepted peaks
    pub min_distance: usize,
}

impl Default for PeakCriteria {
    fn default() -> Self {
        PeakCriteria {
            min_height: Some(0.1),
            min_prominence: 0.05,
            min_distance: 3,
        }
    }
}

/// Find peak indices in `values`, ordered by index
///
/// Filters run in a fixed order: height, then distance, then prominence.
/// When two peaks are closer than `min_distance`, the higher one survives
/// and equal heights keep the lower index.
pub fn find_peaks(values: &[f64], criteria: &PeakCriteria) -> Vec<usize> {
    let mut peaks = local_maxima(values);

    if let Some(min_height) = criteria.min_height {
        peaks.retain(|&p| values[p] >= min_height);
    }

    if criteria.min_distance > 1 && peaks.len() > 1 {
        peaks = select_by_distance(values, &peaks, criteria.min_distance);
    }

    peaks.retain(|&p| prominence(values, p) >= criteria.min_prominence);
    peaks
}

/// Detect peaks on one lane of a session
pub fn detect_lane_peaks(signals: &LaneSignals, lane: usize, criteria: &PeakCriteria) -> Vec<Peak> {
    let values = signals.lane(lane);

    find_peaks(values, criteria)
        .into_iter()
        .map(|index| Peak {
            lane,
            time: signals.times[index],
            index,
            value: values[index],
        })
        .collect()
}

/// Interior samples that rise above their left neighbour and fall afterwards
/// Flat tops report their midpoint (rounded down)
fn local_maxima(values: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if values.len() < 3 {
        return maxima;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }

            if values[ahead] < values[i] {
                let left_edge = i;
                let right_edge = ahead - 1;
                maxima.push((left_edge + right_edge) / 2);
                i = ahead;
            }
        }
        i += 1;
    }

    maxima
}

/// Greedy spacing filter, highest peaks claim their neighbourhood first
fn select_by_distance(values: &[f64], peaks: &[usize], min_distance: usize) -> Vec<usize> {
    let mut keep = vec![true; peaks.len()];

    let mut priority: Vec<usize> = (0..peaks.len()).collect();
    priority.sort_by(|&a, &b| {
        values[peaks[b]]
            .total_cmp(&values[peaks[a]])
            .then(peaks[a].cmp(&peaks[b]))
    });

    for &j in &priority {
        if !keep[j] {
            continue;
        }

        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < min_distance {
            k -= 1;
            keep[k] = false;
        }

        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < min_distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, kept)| kept.then_some(p))
        .collect()
}

/// Height of a peak above the higher of its two bases
///
/// Each base is the lowest sample between the peak and the first strictly
/// higher sample on that side (or the array edge).
pub fn prominence(values: &[f64], peak: usize) -> f64 {
    let height = values[peak];

    let left_base = values[..=peak]
        .iter()
        .rev()
        .take_while(|&&v| v <= height)
        .fold(height, |lo, &v| lo.min(v));

    let right_base = values[peak..]
        .iter()
        .take_while(|&&v| v <= height)
        .fold(height, |lo, &v| lo.min(v));

    height - left_base.max(right_base)
}
