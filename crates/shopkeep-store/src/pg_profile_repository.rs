//! `PostgreSQL` implementation of the `ProfileRepository` trait.
//!
//! Each profile is one JSONB document keyed by visitor id. The revision and
//! phone number are duplicated into columns for the concurrency check and
//! the SMS lookup.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::debug;

use shopkeep_core::error::DomainError;
use shopkeep_core::profile::{PlayerProfile, ProfileRepository, VisitorId};

use crate::schema::CREATE_PLAYER_PROFILES_TABLE;

/// PostgreSQL-backed profile repository.
#[derive(Debug, Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

fn store_error(e: sqlx::Error) -> DomainError {
    DomainError::UpstreamUnavailable(format!("profile store: {e}"))
}

fn decode_profile(row: &sqlx::postgres::PgRow) -> Result<PlayerProfile, DomainError> {
    let Json(mut profile): Json<PlayerProfile> = row.try_get("document").map_err(store_error)?;
    profile.revision = row.try_get("revision").map_err(store_error)?;
    Ok(profile)
}

impl PgProfileRepository {
    /// Creates a new `PgProfileRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the profile table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns the database error if the statement fails.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(CREATE_PLAYER_PROFILES_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn current_revision(&self, visitor_id: &VisitorId) -> Result<i64, DomainError> {
        let row = sqlx::query("SELECT revision FROM player_profiles WHERE visitor_id = $1")
            .bind(visitor_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        match row {
            Some(row) => row.try_get("revision").map_err(store_error),
            None => Ok(0),
        }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn load(&self, visitor_id: &VisitorId) -> Result<Option<PlayerProfile>, DomainError> {
        let row = sqlx::query(
            "SELECT document, revision FROM player_profiles WHERE visitor_id = $1",
        )
        .bind(visitor_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.as_ref().map(decode_profile).transpose()
    }

    async fn save(
        &self,
        profile: &PlayerProfile,
        expected_revision: i64,
    ) -> Result<(), DomainError> {
        let result = if expected_revision == 0 {
            sqlx::query(
                "INSERT INTO player_profiles (visitor_id, document, revision, phone_number, updated_at) \
                 VALUES ($1, $2, $3, $4, NOW()) \
                 ON CONFLICT (visitor_id) DO NOTHING",
            )
            .bind(profile.visitor_id.as_str())
            .bind(Json(profile))
            .bind(profile.revision)
            .bind(profile.phone_number.as_deref())
            .execute(&self.pool)
            .await
        } else {
            sqlx::query(
                "UPDATE player_profiles \
                 SET document = $2, revision = $3, phone_number = $4, updated_at = NOW() \
                 WHERE visitor_id = $1 AND revision = $5",
            )
            .bind(profile.visitor_id.as_str())
            .bind(Json(profile))
            .bind(profile.revision)
            .bind(profile.phone_number.as_deref())
            .bind(expected_revision)
            .execute(&self.pool)
            .await
        }
        .map_err(store_error)?;

        if result.rows_affected() == 0 {
            let actual = self.current_revision(&profile.visitor_id).await?;
            return Err(DomainError::ConcurrencyConflict {
                visitor_id: profile.visitor_id.to_string(),
                expected: expected_revision,
                actual,
            });
        }

        debug!(visitor_id = %profile.visitor_id, revision = profile.revision, "profile saved");
        Ok(())
    }

    async fn find_by_phone(
        &self,
        phone_number: &str,
    ) -> Result<Option<PlayerProfile>, DomainError> {
        let row = sqlx::query(
            "SELECT document, revision FROM player_profiles \
             WHERE phone_number = $1 ORDER BY updated_at DESC LIMIT 1",
        )
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.as_ref().map(decode_profile).transpose()
    }
}
