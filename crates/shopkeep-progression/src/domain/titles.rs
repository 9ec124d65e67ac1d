//! Title tier table and promotion rules.

use serde::{Deserialize, Serialize};
use shopkeep_core::error::DomainError;
use shopkeep_core::profile::PlayerProfile;

/// Title every new profile starts with.
pub const DEFAULT_BASE_TITLE: &str = "Curious Apprentice";

/// A progression milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleTier {
    /// Good answers required, inclusive.
    pub min_good_answers: u32,
    /// Title awarded on reaching the threshold.
    pub title: String,
}

/// Ordered set of tiers above a base title.
///
/// Tiers are kept sorted by ascending threshold; promotion walks them from
/// the highest threshold down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTitleTable")]
pub struct TitleTable {
    base_title: String,
    tiers: Vec<TitleTier>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTitleTable {
    base_title: String,
    tiers: Vec<TitleTier>,
}

impl TryFrom<RawTitleTable> for TitleTable {
    type Error = DomainError;

    fn try_from(raw: RawTitleTable) -> Result<Self, Self::Error> {
        Self::new(raw.base_title, raw.tiers)
    }
}

impl TitleTable {
    /// Builds a table, sorting tiers by threshold.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if a title is blank or appears
    /// twice (including the base title), or two tiers share a threshold.
    pub fn new(base_title: impl Into<String>, mut tiers: Vec<TitleTier>) -> Result<Self, DomainError> {
        let base_title = base_title.into();
        if base_title.trim().is_empty() || tiers.iter().any(|t| t.title.trim().is_empty()) {
            return Err(DomainError::InvalidInput("titles must not be blank".to_owned()));
        }

        tiers.sort_by_key(|t| t.min_good_answers);
        for pair in tiers.windows(2) {
            if pair[0].min_good_answers == pair[1].min_good_answers {
                return Err(DomainError::InvalidInput(format!(
                    "two tiers share the threshold {}",
                    pair[0].min_good_answers
                )));
            }
        }
        for (i, tier) in tiers.iter().enumerate() {
            if tier.title == base_title || tiers[..i].iter().any(|t| t.title == tier.title) {
                return Err(DomainError::InvalidInput(format!(
                    "title {:?} appears more than once",
                    tier.title
                )));
            }
        }

        Ok(Self { base_title, tiers })
    }

    /// Parses a table from YAML.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if the document does not parse or
    /// fails validation.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DomainError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| DomainError::InvalidInput(format!("title table is not valid: {e}")))
    }

    /// Title of a brand-new profile.
    #[must_use]
    pub fn base_title(&self) -> &str {
        &self.base_title
    }

    /// Tiers in ascending threshold order.
    #[must_use]
    pub fn tiers(&self) -> &[TitleTier] {
        &self.tiers
    }

    // Base title (and unknown titles) rank below every tier.
    fn rank(&self, title: &str) -> Option<usize> {
        self.tiers.iter().position(|t| t.title == title)
    }

    /// The tier `profile` should be promoted to, if any.
    ///
    /// The highest satisfied tier wins. It is awarded only when it is not
    /// yet unlocked and ranks strictly above the current title, so a single
    /// update promotes at most once and never regresses.
    #[must_use]
    pub fn promotion_for(&self, profile: &PlayerProfile) -> Option<&TitleTier> {
        let reached = self
            .tiers
            .iter()
            .rev()
            .find(|t| profile.good_answer_count >= t.min_good_answers)?;

        let outranks_current = self.rank(&reached.title) > self.rank(&profile.current_title);
        (outranks_current && !profile.has_unlocked(&reached.title)).then_some(reached)
    }

    /// Applies [`Self::promotion_for`] to `profile`, returning the new title.
    pub fn apply_promotion(&self, profile: &mut PlayerProfile) -> Option<String> {
        let title = self.promotion_for(profile)?.title.clone();
        profile.unlock_title(&title).then_some(title)
    }
}

impl Default for TitleTable {
    fn default() -> Self {
        Self {
            base_title: DEFAULT_BASE_TITLE.to_owned(),
            tiers: vec![
                TitleTier {
                    min_good_answers: 10,
                    title: "Village Sage".to_owned(),
                },
                TitleTier {
                    min_good_answers: 25,
                    title: "Royal Counselor".to_owned(),
                },
            ],
        }
    }
}
