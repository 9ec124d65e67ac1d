//! Test repositories: mock `ProfileRepository` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use shopkeep_core::error::DomainError;
use shopkeep_core::profile::{PlayerProfile, ProfileRepository, VisitorId};

/// A profile repository backed by a map that records every `save` call.
/// Enforces the same optimistic-concurrency rules as the real stores.
#[derive(Debug, Default)]
pub struct RecordingProfileRepository {
    profiles: Mutex<HashMap<String, PlayerProfile>>,
    saved: Mutex<Vec<(PlayerProfile, i64)>>,
}

impl RecordingProfileRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-seeded with `profiles`.
    #[must_use]
    pub fn with_profiles(profiles: Vec<PlayerProfile>) -> Self {
        let map = profiles
            .into_iter()
            .map(|p| (p.visitor_id.as_str().to_owned(), p))
            .collect();
        Self {
            profiles: Mutex::new(map),
            saved: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all `(profile, expected_revision)` pairs saved.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_profiles(&self) -> Vec<(PlayerProfile, i64)> {
        self.saved.lock().unwrap().clone()
    }

    /// Returns the currently stored profile for `visitor_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stored(&self, visitor_id: &str) -> Option<PlayerProfile> {
        self.profiles.lock().unwrap().get(visitor_id).cloned()
    }
}

#[async_trait]
impl ProfileRepository for RecordingProfileRepository {
    async fn load(&self, visitor_id: &VisitorId) -> Result<Option<PlayerProfile>, DomainError> {
        Ok(self.profiles.lock().unwrap().get(visitor_id.as_str()).cloned())
    }

    async fn save(
        &self,
        profile: &PlayerProfile,
        expected_revision: i64,
    ) -> Result<(), DomainError> {
        let mut profiles = self.profiles.lock().unwrap();
        let actual = profiles
            .get(profile.visitor_id.as_str())
            .map_or(0, |p| p.revision);
        if actual != expected_revision {
            return Err(DomainError::ConcurrencyConflict {
                visitor_id: profile.visitor_id.to_string(),
                expected: expected_revision,
                actual,
            });
        }
        profiles.insert(profile.visitor_id.as_str().to_owned(), profile.clone());
        self.saved
            .lock()
            .unwrap()
            .push((profile.clone(), expected_revision));
        Ok(())
    }

    async fn find_by_phone(
        &self,
        phone_number: &str,
    ) -> Result<Option<PlayerProfile>, DomainError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .values()
            .find(|p| p.phone_number.as_deref() == Some(phone_number))
            .cloned())
    }
}

/// A profile repository that always returns an upstream error. Useful for
/// testing document-store outages.
#[derive(Debug)]
pub struct FailingProfileRepository;

#[async_trait]
impl ProfileRepository for FailingProfileRepository {
    async fn load(&self, _visitor_id: &VisitorId) -> Result<Option<PlayerProfile>, DomainError> {
        Err(DomainError::UpstreamUnavailable("connection refused".into()))
    }

    async fn save(
        &self,
        _profile: &PlayerProfile,
        _expected_revision: i64,
    ) -> Result<(), DomainError> {
        Err(DomainError::UpstreamUnavailable("connection refused".into()))
    }

    async fn find_by_phone(
        &self,
        _phone_number: &str,
    ) -> Result<Option<PlayerProfile>, DomainError> {
        Err(DomainError::UpstreamUnavailable("connection refused".into()))
    }
}
