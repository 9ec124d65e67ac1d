//! Routes for answer evaluation.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use shopkeep_progression::application::evaluation::handle_evaluate_answer;
use shopkeep_progression::domain::commands::EvaluateAnswer;

use crate::error::ApiError;
use crate::routes::visitor_from_headers;
use crate::state::AppState;

/// Request body for POST /evaluate. Missing fields are treated as blank.
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// Response body for POST /evaluate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    /// The evaluator's reply, verbatim.
    pub feedback: String,
    pub score: u32,
    /// Whether the reply carried a `Score:` label at all.
    pub score_found: bool,
    pub good_answer: bool,
    pub promoted_to: Option<String>,
    pub status: &'static str,
}

/// POST /evaluate
#[instrument(skip(state, headers, request))]
async fn evaluate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let command = EvaluateAnswer {
        correlation_id: Uuid::new_v4(),
        question: request.question,
        answer: request.answer,
        visitor_id: visitor_from_headers(&headers)?,
    };

    info!(
        correlation_id = %command.correlation_id,
        anonymous = command.visitor_id.is_none(),
        "handling evaluate_answer command"
    );

    let outcome = handle_evaluate_answer(
        &command,
        &state.titles,
        state.clock.as_ref(),
        &*state.generator,
        &*state.profiles,
        &*state.notifier,
    )
    .await?;

    Ok(Json(EvaluateResponse {
        feedback: outcome.feedback,
        score: outcome.score,
        score_found: outcome.score_found,
        good_answer: outcome.good_answer,
        promoted_to: outcome.promoted_to,
        status: "success",
    }))
}

/// Returns the router for answer evaluation.
pub fn router() -> Router<AppState> {
    Router::new().route("/evaluate", post(evaluate))
}
