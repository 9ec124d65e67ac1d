//! Routes for profile lookup.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::{Json, Router, routing::get};
use tracing::{info, instrument};
use uuid::Uuid;

use shopkeep_core::profile::VisitorId;
use shopkeep_progression::application::profiles::{ProfileView, handle_look_up_profile};
use shopkeep_progression::domain::commands::LookUpProfile;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /player/{visitor_id}
///
/// Creates the profile on first sight and counts a visit otherwise.
#[instrument(skip(state, headers))]
async fn get_player(
    State(state): State<AppState>,
    Path(visitor_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ProfileView>, ApiError> {
    let command = LookUpProfile {
        correlation_id: Uuid::new_v4(),
        visitor_id: VisitorId::parse(&visitor_id)?,
        client_signature: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    };

    info!(correlation_id = %command.correlation_id, "handling look_up_profile command");

    let view = handle_look_up_profile(
        &command,
        &state.titles,
        state.clock.as_ref(),
        &*state.profiles,
    )
    .await?;

    Ok(Json(view))
}

/// Returns the router for profile lookup.
pub fn router() -> Router<AppState> {
    Router::new().route("/player/{visitor_id}", get(get_player))
}
