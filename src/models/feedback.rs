use serde::{Deserialize, Serialize};

/// Sentiment a session has recorded for a movie
///
/// One label per (movie, session) pair; a new vote overwrites the old one.
/// Only `Bad` feeds the recommendation exclusion list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FeedbackLabel {
    Good,
    Bad,
    Meh,
}

impl FeedbackLabel {
    /// Stable string form used as the storage value
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackLabel::Good => "Good",
            FeedbackLabel::Bad => "Bad",
            FeedbackLabel::Meh => "Meh",
        }
    }
}

impl std::fmt::Display for FeedbackLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
