// Note matching module
// Candidate generation and global greedy note-to-peak assignment

pub mod candidates;
pub mod greedy;

pub use candidates::{generate_candidates, MatchCandidate};
pub use greedy::{greedy_match, Assignment, MatchOutcome};
