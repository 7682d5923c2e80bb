// Candidate generation
// Pairs every expected note with every same-lane peak inside the matching window

use serde::{Deserialize, Serialize};

use crate::signal::{ExpectedNote, Peak};

/// A possible note-to-peak pairing, before conflicts are resolved
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// |peak time - note time| in milliseconds
    pub time_diff: f64,

    /// Position of the note in the expected-notes list
    pub note_index: usize,

    /// Sample index of the peak
    pub peak_index: usize,

    pub lane: usize,

    /// Peak time in milliseconds
    pub peak_time: f64,
}

/// Build all candidates for `notes` against `lane_peaks` (indexed by lane)
///
/// Many-to-many: a note can see several peaks and a peak several notes.
/// Notes on lanes with no peak list produce nothing.
pub fn generate_candidates(
    notes: &[ExpectedNote],
    lane_peaks: &[Vec<Peak>],
    window_ms: f64,
) -> Vec<MatchCandidate> {
    let mut candidates = Vec::new();

    for (note_index, note) in notes.iter().enumerate() {
        let Some(peaks) = lane_peaks.get(note.lane) else {
            continue;
        };

        for peak in peaks {
            let time_diff = (peak.time - note.time).abs();
            if time_diff <= window_ms {
                candidates.push(MatchCandidate {
                    time_diff,
                    note_index,
                    peak_index: peak.index,
                    lane: note.lane,
                    peak_time: peak.time,
                });
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(lane: usize, index: usize, time: f64) -> Peak {
        Peak {
            lane,
            time,
            index,
            value: 0.5,
        }
    }

    #[test]
    fn test_window_is_inclusive() {
        let notes = vec![ExpectedNote { time: 1000.0, lane: 0 }];
        let lane_peaks = vec![vec![
            peak(0, 10, 0.0),
            peak(0, 50, 1500.0),
            peak(0, 90, 2000.0),
            peak(0, 95, 2000.5),
        ]];

        let candidates = generate_candidates(&notes, &lane_peaks, 1000.0);

        let diffs: Vec<f64> = candidates.iter().map(|c| c.time_diff).collect();
        assert_eq!(diffs, vec![1000.0, 500.0, 1000.0]);
    }

    #[test]
    fn test_lanes_are_kept_apart() {
        let notes = vec![
            ExpectedNote { time: 500.0, lane: 0 },
            ExpectedNote { time: 500.0, lane: 1 },
        ];
        let lane_peaks = vec![vec![peak(0, 5, 520.0)], vec![]];

        let candidates = generate_candidates(&notes, &lane_peaks, 1000.0);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].note_index, 0);
        assert_eq!(candidates[0].lane, 0);
        assert_eq!(candidates[0].peak_index, 5);
    }

    #[test]
    fn test_peak_shared_between_notes() {
        let notes = vec![
            ExpectedNote { time: 1000.0, lane: 2 },
            ExpectedNote { time: 1050.0, lane: 2 },
        ];
        let lane_peaks = vec![vec![], vec![], vec![peak(2, 7, 1020.0)]];

        let candidates = generate_candidates(&notes, &lane_peaks, 1000.0);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].time_diff, 20.0);
        assert_eq!(candidates[1].time_diff, 30.0);
    }
}
