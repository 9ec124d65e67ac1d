//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use shopkeep_core::clock::Clock;
use shopkeep_core::generation::TextGenerator;
use shopkeep_core::notify::Notifier;
use shopkeep_core::profile::ProfileRepository;
use shopkeep_progression::domain::titles::TitleTable;
use shopkeep_store::memory::InMemoryProfileRepository;
use shopkeep_test_support::{FixedClock, RecordingNotifier, ScriptedTextGenerator};
use tower::ServiceExt;

use shopkeep_api::routes;
use shopkeep_api::routes::VISITOR_ID_HEADER;
use shopkeep_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Ports wired into a test app. Keep the handles to inspect what the
/// handlers did.
pub struct TestPorts {
    pub profiles: Arc<InMemoryProfileRepository>,
    pub generator: Arc<dyn TextGenerator>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestPorts {
    /// In-memory store, recording notifier and a generator that replies
    /// with `replies` in order.
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_generator(Arc::new(ScriptedTextGenerator::new(replies)))
    }

    pub fn with_generator(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            profiles: Arc::new(InMemoryProfileRepository::new()),
            generator,
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }
}

/// Build the full app router with an in-memory profile store and a fixed
/// clock. Uses the same route structure as `main.rs`.
pub fn build_test_app(ports: &TestPorts) -> Router {
    let profiles: Arc<dyn ProfileRepository> = ports.profiles.clone();
    let notifier: Arc<dyn Notifier> = ports.notifier.clone();
    let app_state = AppState::new(
        fixed_clock(),
        profiles,
        Arc::clone(&ports.generator),
        notifier,
        TitleTable::default(),
    );

    routes::router().with_state(app_state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    visitor_id: Option<&str>,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(visitor_id) = visitor_id {
        builder = builder.header(VISITOR_ID_HEADER, visitor_id);
    }
    let request = builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request with a User-Agent and return the response.
pub async fn get_json_as(
    app: Router,
    uri: &str,
    user_agent: &str,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("user-agent", user_agent)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a form POST and return the status and body text.
pub async fn post_form(app: Router, uri: &str, form: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_owned()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, String::from_utf8(body_bytes.to_vec()).unwrap())
}
