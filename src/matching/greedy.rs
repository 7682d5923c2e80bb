// Greedy note-to-peak matching
// One global pass over candidates sorted by time distance, closest pairs claim first

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::candidates::MatchCandidate;

/// An accepted note-to-peak pairing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub note_index: usize,
    pub lane: usize,

    /// Sample index of the claimed peak
    pub peak_index: usize,

    pub peak_time: f64,
    pub time_diff: f64,
}

/// Result of resolving all candidates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Accepted pairings, in acceptance order (ascending time distance)
    pub assignments: Vec<Assignment>,

    /// Note indices that ended up without a peak, ascending
    pub unmatched_notes: Vec<usize>,
}

/// Resolve candidates into a one-to-one matching
///
/// Ties on distance are broken by note index, then peak index, then lane.
/// A peak is identified by its lane and time.
pub fn greedy_match(candidates: &[MatchCandidate], note_count: usize) -> MatchOutcome {
    let mut sorted: Vec<&MatchCandidate> = candidates.iter().collect();
    sorted.sort_by(|a, b| {
        a.time_diff
            .total_cmp(&b.time_diff)
            .then(a.note_index.cmp(&b.note_index))
            .then(a.peak_index.cmp(&b.peak_index))
            .then(a.lane.cmp(&b.lane))
    });

    let mut claimed_notes: HashSet<usize> = HashSet::new();
    let mut claimed_peaks: HashSet<(usize, u64)> = HashSet::new();
    let mut assignments = Vec::new();

    for candidate in sorted {
        let peak_key = (candidate.lane, candidate.peak_time.to_bits());
        if claimed_notes.contains(&candidate.note_index) || claimed_peaks.contains(&peak_key) {
            continue;
        }

        claimed_notes.insert(candidate.note_index);
        claimed_peaks.insert(peak_key);
        assignments.push(Assignment {
            note_index: candidate.note_index,
            lane: candidate.lane,
            peak_index: candidate.peak_index,
            peak_time: candidate.peak_time,
            time_diff: candidate.time_diff,
        });
    }

    let unmatched_notes = (0..note_count)
        .filter(|i| !claimed_notes.contains(i))
        .collect();

    MatchOutcome {
        assignments,
        unmatched_notes,
    }
}
