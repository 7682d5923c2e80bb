// Session tag summary
// Per-tag counts across a session and the feedback prompt built from them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{Tag, TaggedGesture};

/// How many gestures carry each tag
/// A gesture with k tags contributes to k counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSummary {
    pub total_gestures: usize,

    /// Count for every tag, zero when unused
    pub counts: BTreeMap<Tag, usize>,
}

impl TagSummary {
    pub fn from_gestures(gestures: &[TaggedGesture]) -> Self {
        let mut counts: BTreeMap<Tag, usize> = Tag::ALL.into_iter().map(|t| (t, 0)).collect();

        for gesture in gestures {
            for tag in gesture.tags.iter() {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }

        TagSummary {
            total_gestures: gestures.len(),
            counts,
        }
    }

    pub fn count(&self, tag: Tag) -> usize {
        self.counts.get(&tag).copied().unwrap_or(0)
    }

    /// Tags with a non-zero count, in summary order
    pub fn present(&self) -> Vec<(Tag, usize)> {
        Tag::ALL
            .into_iter()
            .map(|tag| (tag, self.count(tag)))
            .filter(|&(_, count)| count > 0)
            .collect()
    }
}

/// Prompt text handed to an external feedback generator
pub fn build_feedback_prompt(summary: &TagSummary) -> String {
    let mut prompt = String::new();

    if summary.total_gestures == 0 {
        prompt.push_str("In the last session, none of the player's presses matched a note.\n");
    } else {
        prompt.push_str("In the last session, the player had:\n");
        for (tag, count) in summary.present() {
            prompt.push_str(&format!("- {} {}\n", count, tag.display_name()));
        }
        prompt.push_str(&format!("Out of {} presses.\n", summary.total_gestures));
    }

    prompt.push_str("\nPlease give friendly and concise feedback.");
    prompt
}
