// Gesture module
// Boundary extraction, feature computation, rule-based tagging, and session summaries

pub mod extract;
pub mod features;
pub mod summary;
pub mod tagging;
pub mod types;

pub use extract::{cut_segment, find_bounds, press_end, press_start, GestureBounds};
pub use features::{compute_features, count_valleys};
pub use summary::{build_feedback_prompt, TagSummary};
pub use tagging::{RuleTagger, TagRules};
pub use types::{GestureFeatures, GestureSegment, Tag, TagSet, TaggedGesture};
