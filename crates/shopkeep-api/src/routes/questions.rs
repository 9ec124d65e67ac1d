//! Routes for question generation.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use tracing::{info, instrument};

use shopkeep_questions::application::generation::{
    GeneratedQuestions, clamp_count, generate_questions,
};

use crate::state::AppState;

/// Query string for GET /generate-questions.
#[derive(Debug, Deserialize)]
pub struct GenerateQuestionsQuery {
    /// Requested batch size; clamped into the supported range.
    pub count: Option<usize>,
}

/// GET /generate-questions
///
/// Never fails: generator problems degrade to the static defaults.
#[instrument(skip(state))]
async fn generate(
    State(state): State<AppState>,
    Query(query): Query<GenerateQuestionsQuery>,
) -> Json<GeneratedQuestions> {
    let count = clamp_count(query.count);
    let generated = generate_questions(count, &*state.generator).await;
    info!(
        count = generated.questions.len(),
        status = ?generated.status,
        "questions generated"
    );
    Json(generated)
}

/// Returns the router for question generation.
pub fn router() -> Router<AppState> {
    Router::new().route("/generate-questions", get(generate))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use shopkeep_test_support::{
        FailingTextGenerator, RecordingNotifier, RecordingProfileRepository,
        ScriptedTextGenerator,
    };
    use tower::ServiceExt;

    use crate::state::test_support::app_state_with;

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_generated_questions_are_returned() {
        // Arrange
        let generator = Arc::new(ScriptedTextGenerator::new([
            r#"["Why doth my scrying glass show naught but a spinning wheel?", "How shall I banish the pop-up imps?"]"#,
        ]));
        let app = router().with_state(app_state_with(
            Arc::new(RecordingProfileRepository::new()),
            generator.clone(),
            Arc::new(RecordingNotifier::new()),
        ));

        // Act
        let (status, json) = get(app, "/generate-questions?count=2").await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["questions"].as_array().unwrap().len(), 2);
        assert!(generator.requests()[0].user_prompt.contains('2'));
    }

    #[tokio::test]
    async fn test_generator_outage_falls_back_to_defaults() {
        let app = router().with_state(app_state_with(
            Arc::new(RecordingProfileRepository::new()),
            Arc::new(FailingTextGenerator::new()),
            Arc::new(RecordingNotifier::new()),
        ));

        let (status, json) = get(app, "/generate-questions").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "fallback");
        let questions = json["questions"].as_array().unwrap();
        assert!(!questions.is_empty());
        assert!(questions.iter().all(|q| !q.as_str().unwrap().is_empty()));
    }
}
