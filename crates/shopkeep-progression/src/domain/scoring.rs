//! Score extraction from free-form evaluator feedback.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Scores at or above this count as good answers.
pub const GOOD_ANSWER_THRESHOLD: u32 = 65;

/// Highest meaningful score.
pub const MAX_SCORE: u32 = 100;

static SCORE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)score\s*:\s*(\d+)").expect("score pattern is valid"));

/// Finds the first `Score: N` label in `feedback`. Scores above
/// [`MAX_SCORE`] are clamped.
#[must_use]
pub fn extract_score(feedback: &str) -> Option<u32> {
    let digits = SCORE_LABEL.captures(feedback)?.get(1)?.as_str();
    let score = digits.parse::<u64>().map_or(MAX_SCORE, |n| {
        u32::try_from(n.min(u64::from(MAX_SCORE))).unwrap_or(MAX_SCORE)
    });
    Some(score)
}

/// Whether `score` counts towards promotion.
#[must_use]
pub fn is_good_answer(score: u32) -> bool {
    score >= GOOD_ANSWER_THRESHOLD
}

/// How the villager at the counter takes the player's counsel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VillagerReaction {
    Delighted,
    Pondering,
    Displeased,
}

impl VillagerReaction {
    /// Maps a score to a reaction.
    #[must_use]
    pub fn for_score(score: u32) -> Self {
        match score {
            75.. => Self::Delighted,
            50..=74 => Self::Pondering,
            _ => Self::Displeased,
        }
    }

    /// Line shown above the feedback.
    #[must_use]
    pub fn line(self) -> &'static str {
        match self {
            Self::Delighted => {
                "Verily, the villager's face doth shine with the radiance of thy wise counsel!"
            }
            Self::Pondering => "The villager pondereth thy words with measured contemplation.",
            Self::Displeased => {
                "Alas, the villager's countenance darkens at thy questionable wisdom."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_score_from_three_field_reply() {
        let reply = "Score: 80\nFeedback: A wise answer.\nSuggestion: Mention the power cable.";
        assert_eq!(extract_score(reply), Some(80));
    }

    #[test]
    fn test_extract_score_is_case_and_space_tolerant() {
        assert_eq!(extract_score("SCORE: 42"), Some(42));
        assert_eq!(extract_score("score :   7 out of 100"), Some(7));
    }

    #[test]
    fn test_extract_score_missing_label() {
        assert_eq!(extract_score("Feedback: no number here"), None);
        assert_eq!(extract_score(""), None);
    }

    #[test]
    fn test_extract_score_clamps_large_values() {
        assert_eq!(extract_score("Score: 250"), Some(MAX_SCORE));
        assert_eq!(extract_score("Score: 99999999999999999999999"), Some(MAX_SCORE));
    }

    #[test]
    fn test_good_answer_threshold_is_inclusive() {
        assert!(is_good_answer(65));
        assert!(!is_good_answer(64));
    }

    #[test]
    fn test_villager_reaction_bands() {
        assert_eq!(VillagerReaction::for_score(75), VillagerReaction::Delighted);
        assert_eq!(VillagerReaction::for_score(50), VillagerReaction::Pondering);
        assert_eq!(VillagerReaction::for_score(49), VillagerReaction::Displeased);
    }
}
