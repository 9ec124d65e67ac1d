//! Route modules organized by bounded context.

use axum::Router;
use axum::http::HeaderMap;
use shopkeep_core::profile::VisitorId;

use crate::error::ApiError;
use crate::state::AppState;

pub mod evaluation;
pub mod health;
pub mod messaging;
pub mod player;
pub mod questions;

/// Header the kiosk uses to identify its visitor.
pub const VISITOR_ID_HEADER: &str = "x-visitor-id";

/// Returns the full application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(player::router())
        .merge(evaluation::router())
        .merge(questions::router())
        .merge(messaging::router())
}

/// Reads the optional visitor header. A missing or blank header is an
/// anonymous caller.
pub(crate) fn visitor_from_headers(headers: &HeaderMap) -> Result<Option<VisitorId>, ApiError> {
    let Some(value) = headers.get(VISITOR_ID_HEADER) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| {
        shopkeep_core::error::DomainError::InvalidInput(format!(
            "{VISITOR_ID_HEADER} must be visible ASCII"
        ))
    })?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(VisitorId::parse(raw)?))
}
