//! Routes for outbound hint texts and the inbound SMS webhook.

use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use axum::{Form, Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use shopkeep_messaging::application::hints::handle_request_hints;
use shopkeep_messaging::application::webhook::handle_inbound_sms;
use shopkeep_messaging::domain::commands::{ReplyToInboundSms, RequestHints};

use crate::error::ApiError;
use crate::routes::visitor_from_headers;
use crate::state::AppState;

/// Request body for POST /request-hints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestHintsRequest {
    #[serde(default)]
    pub phone_number: String,
}

/// Response body for POST /request-hints.
#[derive(Debug, Serialize)]
pub struct RequestHintsResponse {
    pub success: bool,
}

/// Form posted by the SMS provider.
#[derive(Debug, Deserialize)]
pub struct InboundSmsForm {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

/// POST /request-hints
///
/// Problems with the number or the provider are reported as
/// `success: false`, not as an error status.
#[instrument(skip(state, headers, request))]
async fn request_hints(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RequestHintsRequest>,
) -> Result<Json<RequestHintsResponse>, ApiError> {
    let command = RequestHints {
        correlation_id: Uuid::new_v4(),
        visitor_id: visitor_from_headers(&headers)?,
        phone_number: request.phone_number,
    };

    info!(correlation_id = %command.correlation_id, "handling request_hints command");

    let success = handle_request_hints(
        &command,
        &state.titles,
        state.clock.as_ref(),
        &*state.profiles,
        &*state.notifier,
    )
    .await;

    Ok(Json(RequestHintsResponse { success }))
}

/// POST /sms
#[instrument(skip(state, form))]
async fn inbound_sms(
    State(state): State<AppState>,
    Form(form): Form<InboundSmsForm>,
) -> impl IntoResponse {
    let command = ReplyToInboundSms {
        correlation_id: Uuid::new_v4(),
        from: form.from,
        body: form.body,
    };

    let twiml = handle_inbound_sms(&command, &*state.profiles).await;

    ([(header::CONTENT_TYPE, "text/xml; charset=utf-8")], twiml)
}

/// Returns the router for the messaging endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request-hints", post(request_hints))
        .route("/sms", post(inbound_sms))
}
