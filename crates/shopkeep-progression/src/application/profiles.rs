//! Profile lookup, visit accounting and phone registration.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shopkeep_core::client::ClientClass;
use shopkeep_core::clock::Clock;
use shopkeep_core::error::DomainError;
use shopkeep_core::profile::{PlayerProfile, ProfileRepository, VisitorId};
use tracing::{info, warn};

use crate::domain::commands::{LookUpProfile, RegisterPhoneNumber};
use crate::domain::titles::TitleTable;

/// How often a save is retried after losing an optimistic-concurrency race.
pub const MAX_SAVE_ATTEMPTS: u32 = 3;

/// The part of a profile the visitor may see. The registered phone number
/// and the store revision stay server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub visitor_id: VisitorId,
    pub visit_count: u32,
    pub answer_count: u32,
    pub good_answer_count: u32,
    pub current_title: String,
    pub unlocked_titles: Vec<String>,
    pub last_visit: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<PlayerProfile> for PublicProfile {
    fn from(profile: PlayerProfile) -> Self {
        Self {
            visitor_id: profile.visitor_id,
            visit_count: profile.visit_count,
            answer_count: profile.answer_count,
            good_answer_count: profile.good_answer_count,
            current_title: profile.current_title,
            unlocked_titles: profile.unlocked_titles,
            last_visit: profile.last_visit,
            created_at: profile.created_at,
        }
    }
}

/// A profile annotated with the caller's browser classification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: PublicProfile,
    /// Best-effort browser family of the caller.
    pub browser: ClientClass,
    /// Whether this lookup created the profile.
    pub is_new: bool,
}

/// Loads (or creates) a profile, applies `mutate`, and saves it with
/// optimistic concurrency, retrying lost races.
///
/// `mutate` receives the profile and whether it was just created.
pub(crate) async fn upsert_profile<R, F>(
    visitor_id: &VisitorId,
    titles: &TitleTable,
    clock: &dyn Clock,
    profiles: &dyn ProfileRepository,
    mut mutate: F,
) -> Result<(PlayerProfile, bool, R), DomainError>
where
    F: FnMut(&mut PlayerProfile, bool) -> R + Send,
    R: Send,
{
    let mut attempt = 1;
    loop {
        let (mut profile, expected_revision, created) = match profiles.load(visitor_id).await? {
            Some(existing) => {
                let revision = existing.revision;
                (existing, revision, false)
            }
            None => (
                PlayerProfile::new(visitor_id.clone(), titles.base_title(), clock.now()),
                0,
                true,
            ),
        };

        let result = mutate(&mut profile, created);
        profile.revision = expected_revision + 1;

        match profiles.save(&profile, expected_revision).await {
            Ok(()) => return Ok((profile, created, result)),
            Err(DomainError::ConcurrencyConflict { .. }) if attempt < MAX_SAVE_ATTEMPTS => {
                warn!(%visitor_id, attempt, "profile save lost a race, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Handles `LookUpProfile`: creates the profile with zeroed counters and the
/// base title on first sight, otherwise counts the visit.
///
/// # Errors
///
/// Returns `DomainError::UpstreamUnavailable` if the document store fails,
/// or `DomainError::ConcurrencyConflict` if every save attempt lost a race.
pub async fn handle_look_up_profile(
    command: &LookUpProfile,
    titles: &TitleTable,
    clock: &dyn Clock,
    profiles: &dyn ProfileRepository,
) -> Result<ProfileView, DomainError> {
    let now = clock.now();
    let (profile, created, ()) =
        upsert_profile(&command.visitor_id, titles, clock, profiles, |profile, created| {
            if !created {
                profile.record_visit(now);
            }
        })
        .await?;

    let browser = ClientClass::classify(command.client_signature.as_deref());
    info!(
        correlation_id = %command.correlation_id,
        visitor_id = %command.visitor_id,
        visit_count = profile.visit_count,
        %browser,
        created,
        "profile looked up"
    );

    Ok(ProfileView {
        profile: profile.into(),
        browser,
        is_new: created,
    })
}

/// Handles `RegisterPhoneNumber`: stores the number on the profile,
/// creating the profile if the visitor was never seen.
///
/// # Errors
///
/// Returns `DomainError::UpstreamUnavailable` if the document store fails.
pub async fn handle_register_phone_number(
    command: &RegisterPhoneNumber,
    titles: &TitleTable,
    clock: &dyn Clock,
    profiles: &dyn ProfileRepository,
) -> Result<PlayerProfile, DomainError> {
    let (profile, _, ()) =
        upsert_profile(&command.visitor_id, titles, clock, profiles, |profile, _| {
            profile.phone_number = Some(command.phone_number.clone());
        })
        .await?;

    info!(
        correlation_id = %command.correlation_id,
        visitor_id = %command.visitor_id,
        "phone number registered"
    );
    Ok(profile)
}
