// Rule-based gesture tagger
// Applies independent threshold rules to gesture features; no rule firing means "normal"

use crate::config::AnalysisConfig;

use super::types::{GestureFeatures, Tag, TagSet};

/// Thresholds for each tagging rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagRules {
    /// `time_offset` above this (s) tags `delay`
    pub delay_threshold: f64,

    /// `time_offset` below this (s) tags `early`
    pub early_threshold: f64,

    /// `duration` below this (s) tags `too_short`
    pub short_threshold: f64,

    /// `duration` above this (s) tags `too_long`
    pub long_threshold: f64,

    /// `max_force` below this tags `too_weak`
    pub weak_threshold: f64,

    /// `max_force` above this tags `too_strong`
    pub strong_threshold: f64,
}

impl Default for TagRules {
    fn default() -> Self {
        TagRules::from_config(&AnalysisConfig::default())
    }
}

impl TagRules {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        TagRules {
            delay_threshold: config.delay_threshold,
            early_threshold: config.early_threshold,
            short_threshold: config.short_threshold,
            long_threshold: config.long_threshold,
            weak_threshold: config.weak_threshold,
            strong_threshold: config.strong_threshold,
        }
    }
}

/// Tags gestures from their features
pub struct RuleTagger {
    rules: TagRules,
}

impl RuleTagger {
    /// Create a tagger with default thresholds
    pub fn new() -> Self {
        RuleTagger {
            rules: TagRules::default(),
        }
    }

    /// Create a tagger with custom thresholds
    pub fn with_rules(rules: TagRules) -> Self {
        RuleTagger { rules }
    }

    pub fn rules(&self) -> &TagRules {
        &self.rules
    }

    /// All tags whose rule fires, or exactly `{normal}`
    pub fn tag(&self, f: &GestureFeatures) -> TagSet {
        let r = &self.rules;
        let checks = [
            (f.time_offset > r.delay_threshold, Tag::Delay),
            (f.time_offset < r.early_threshold, Tag::Early),
            (f.duration < r.short_threshold, Tag::TooShort),
            (f.duration > r.long_threshold, Tag::TooLong),
            (f.max_force < r.weak_threshold, Tag::TooWeak),
            (f.max_force > r.strong_threshold, Tag::TooStrong),
            (f.num_valleys > 0, Tag::Jittery),
        ];

        let mut tags: TagSet = checks
            .into_iter()
            .filter_map(|(fired, tag)| fired.then_some(tag))
            .collect();

        if tags.is_empty() {
            tags.insert(Tag::Normal);
        }
        tags
    }
}

impl Default for RuleTagger {
    fn default() -> Self {
        Self::new()
    }
}
