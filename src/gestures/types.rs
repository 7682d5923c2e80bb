// Gesture types
// Quality tags, tag sets, feature records, and the tagged gesture output

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A quality label attached to a gesture
/// Tags are independent; one gesture may carry several
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// No rule fired
    Normal,

    /// Press started well after the note
    Delay,

    /// Press started well before the note
    Early,

    TooShort,
    TooLong,

    /// Peak force never reached the weak threshold
    TooWeak,

    /// Peak force exceeded the strong threshold
    TooStrong,

    /// Pressure dipped and recovered during the press
    Jittery,
}

impl Tag {
    /// Every tag, in declaration order (also the order of summaries and sorted sets)
    pub const ALL: [Tag; 8] = [
        Tag::Normal,
        Tag::Delay,
        Tag::Early,
        Tag::TooShort,
        Tag::TooLong,
        Tag::TooWeak,
        Tag::TooStrong,
        Tag::Jittery,
    ];

    /// Wire name (snake_case)
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Delay => "delay",
            Tag::Early => "early",
            Tag::TooShort => "too_short",
            Tag::TooLong => "too_long",
            Tag::TooWeak => "too_weak",
            Tag::TooStrong => "too_strong",
            Tag::Jittery => "jittery",
            Tag::Normal => "normal",
        }
    }

    /// Parse a wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Tag::ALL.into_iter().find(|tag| tag.as_str() == name)
    }

    /// Human-readable name for prompts and UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Tag::Delay => "late",
            Tag::Early => "early",
            Tag::TooShort => "too short",
            Tag::TooLong => "too long",
            Tag::TooWeak => "too weak",
            Tag::TooStrong => "too strong",
            Tag::Jittery => "jittery",
            Tag::Normal => "normal",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of tags on one gesture, never empty once tagging has run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<Tag>);

impl TagSet {
    pub fn new() -> Self {
        TagSet(BTreeSet::new())
    }

    pub fn insert(&mut self, tag: Tag) -> bool {
        self.0.insert(tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.0.contains(&tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the set is exactly `{normal}`
    pub fn is_normal(&self) -> bool {
        self.0.len() == 1 && self.0.contains(&Tag::Normal)
    }

    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        TagSet(iter.into_iter().collect())
    }
}

/// Numeric features of one gesture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureFeatures {
    /// Press start minus note time, seconds (positive = late)
    pub time_offset: f64,

    /// Press end minus press start, seconds
    pub duration: f64,

    /// Highest pressure in the padded segment
    pub max_force: f64,

    /// Population standard deviation of the padded segment
    pub std_force: f64,

    /// Dips found inside the padded segment
    pub num_valleys: usize,
}

/// Time and pressure slice around a gesture, kept for plotting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureSegment {
    pub times: Vec<f64>,
    pub pressure: Vec<f64>,
}

impl GestureSegment {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// A matched press with its boundaries, features, and quality tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedGesture {
    /// Position of the matched note in the expected-notes list
    pub note_index: usize,

    pub lane: usize,

    /// Target time of the matched note (ms)
    pub note_time: f64,

    pub start_time: f64,
    pub peak_time: f64,
    pub end_time: f64,

    pub start_index: usize,
    pub peak_index: usize,
    pub end_index: usize,

    pub segment: GestureSegment,
    pub features: GestureFeatures,
    pub tags: TagSet,
}
