//! Player profile record and its repository abstraction.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Longest visitor identifier accepted.
pub const MAX_VISITOR_ID_LEN: usize = 128;

/// Opaque, stable identifier of a kiosk visitor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VisitorId(String);

impl VisitorId {
    /// Validates and wraps a visitor identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if the identifier is blank or
    /// longer than [`MAX_VISITOR_ID_LEN`].
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidInput(
                "visitor id must not be empty".to_owned(),
            ));
        }
        if trimmed.len() > MAX_VISITOR_ID_LEN {
            return Err(DomainError::InvalidInput(format!(
                "visitor id must be at most {MAX_VISITOR_ID_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VisitorId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VisitorId> for String {
    fn from(value: VisitorId) -> Self {
        value.0
    }
}

/// Cumulative progression state for one visitor.
///
/// Invariants: `good_answer_count <= answer_count`, `unlocked_titles` only
/// grows, and `current_title` is always the most recently unlocked title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    /// The visitor this profile belongs to.
    pub visitor_id: VisitorId,
    /// Number of profile lookups, including the first.
    pub visit_count: u32,
    /// Answers whose score could be extracted.
    pub answer_count: u32,
    /// Answers that scored at or above the good-answer threshold.
    pub good_answer_count: u32,
    /// The title currently displayed for the player.
    pub current_title: String,
    /// Every title ever awarded, in award order.
    pub unlocked_titles: Vec<String>,
    /// Phone number registered through a hint request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Timestamp of the latest lookup.
    pub last_visit: DateTime<Utc>,
    /// Timestamp of the first lookup.
    pub created_at: DateTime<Utc>,
    /// Document revision used for optimistic concurrency.
    pub revision: i64,
}

impl PlayerProfile {
    /// Creates a first-visit profile holding only the base title.
    #[must_use]
    pub fn new(visitor_id: VisitorId, base_title: &str, now: DateTime<Utc>) -> Self {
        Self {
            visitor_id,
            visit_count: 1,
            answer_count: 0,
            good_answer_count: 0,
            current_title: base_title.to_owned(),
            unlocked_titles: vec![base_title.to_owned()],
            phone_number: None,
            last_visit: now,
            created_at: now,
            revision: 0,
        }
    }

    /// Counts a returning visit.
    pub fn record_visit(&mut self, now: DateTime<Utc>) {
        self.visit_count = self.visit_count.saturating_add(1);
        self.last_visit = now;
    }

    /// Counts one scored answer.
    pub fn record_answer(&mut self, good: bool) {
        self.answer_count = self.answer_count.saturating_add(1);
        if good && self.good_answer_count < self.answer_count {
            self.good_answer_count += 1;
        }
    }

    /// Whether `title` has ever been awarded.
    #[must_use]
    pub fn has_unlocked(&self, title: &str) -> bool {
        self.unlocked_titles.iter().any(|t| t == title)
    }

    /// Awards `title` and makes it current. Returns `false` if it was
    /// already unlocked, leaving the profile untouched.
    pub fn unlock_title(&mut self, title: &str) -> bool {
        if self.has_unlocked(title) {
            return false;
        }
        self.unlocked_titles.push(title.to_owned());
        title.clone_into(&mut self.current_title);
        true
    }
}

/// Document-store access for player profiles.
///
/// `save` uses optimistic concurrency: `expected_revision` is the revision
/// the caller loaded (`0` for a profile that must not exist yet), and
/// `profile.revision` is the revision to store.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Loads the profile for a visitor, if any.
    async fn load(&self, visitor_id: &VisitorId) -> Result<Option<PlayerProfile>, DomainError>;

    /// Inserts or replaces a profile.
    async fn save(&self, profile: &PlayerProfile, expected_revision: i64)
    -> Result<(), DomainError>;

    /// Finds the profile registered to a phone number.
    async fn find_by_phone(&self, phone_number: &str)
    -> Result<Option<PlayerProfile>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_visitor_id_trims_and_rejects_blank() {
        assert_eq!(VisitorId::parse("  abc ").unwrap().as_str(), "abc");
        assert!(VisitorId::parse("   ").is_err());
        assert!(VisitorId::parse(&"x".repeat(MAX_VISITOR_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_new_profile_starts_with_base_title() {
        let profile = PlayerProfile::new(VisitorId::parse("v-1").unwrap(), "Apprentice", fixed_now());
        assert_eq!(profile.visit_count, 1);
        assert_eq!(profile.current_title, "Apprentice");
        assert_eq!(profile.unlocked_titles, vec!["Apprentice".to_owned()]);
        assert_eq!(profile.created_at, profile.last_visit);
    }

    #[test]
    fn test_record_answer_keeps_good_at_most_total() {
        let mut profile =
            PlayerProfile::new(VisitorId::parse("v-1").unwrap(), "Apprentice", fixed_now());
        profile.record_answer(true);
        profile.record_answer(false);
        assert_eq!(profile.answer_count, 2);
        assert_eq!(profile.good_answer_count, 1);
        assert!(profile.good_answer_count <= profile.answer_count);
    }

    #[test]
    fn test_unlock_title_is_append_only() {
        let mut profile =
            PlayerProfile::new(VisitorId::parse("v-1").unwrap(), "Apprentice", fixed_now());
        assert!(profile.unlock_title("Village Sage"));
        assert!(!profile.unlock_title("Village Sage"));
        assert_eq!(profile.unlocked_titles.len(), 2);
        assert_eq!(profile.current_title, "Village Sage");
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = PlayerProfile::new(VisitorId::parse("v-1").unwrap(), "Apprentice", fixed_now());
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["visitorId"], "v-1");
        assert_eq!(json["goodAnswerCount"], 0);
        assert!(json.get("phoneNumber").is_none());
    }
}
