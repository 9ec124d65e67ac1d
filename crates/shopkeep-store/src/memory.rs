//! In-memory profile store for local runs without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use shopkeep_core::error::DomainError;
use shopkeep_core::profile::{PlayerProfile, ProfileRepository, VisitorId};

/// Profile repository backed by a map. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<String, PlayerProfile>>,
}

impl InMemoryProfileRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn load(&self, visitor_id: &VisitorId) -> Result<Option<PlayerProfile>, DomainError> {
        Ok(self.profiles.read().await.get(visitor_id.as_str()).cloned())
    }

    async fn save(
        &self,
        profile: &PlayerProfile,
        expected_revision: i64,
    ) -> Result<(), DomainError> {
        let mut profiles = self.profiles.write().await;
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
        Ok(())
    }

    async fn find_by_phone(
        &self,
        phone_number: &str,
    ) -> Result<Option<PlayerProfile>, DomainError> {
        Ok(self
            .profiles
            .read()
            .await
            .values()
            .filter(|p| p.phone_number.as_deref() == Some(phone_number))
            .max_by_key(|p| p.last_visit)
            .cloned())
    }
}
