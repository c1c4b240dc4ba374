//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::TimeZone;
use http_body_util::BodyExt;
use quizroom_core::clock::Clock;
use quizroom_engine::{EngineSettings, QuizEngine};
use quizroom_mechanics::MechanicRegistry;
use quizroom_store::MemoryRepository;
use quizroom_test_support::{FixedClock, RecordingTransport};
use tower::ServiceExt;
use uuid::Uuid;

use quizroom_api::build_router;
use quizroom_api::state::AppState;

/// Registration, one single-choice question worth 10 points, then the
/// leaderboard (the first and last steps are implicit).
pub const QUIZ_SCENARIO: &str = "\
- type: quiz
  title: Capital of France
  options: [Lyon, Paris, Nice]
  correct: \"2\"
  points: 10
";

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Writes `contents` to a fresh temporary scenario file.
pub fn scenario_file(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("quizroom-api-{}.yaml", Uuid::new_v4()));
    std::fs::write(&path, contents).unwrap();
    path
}

/// Test application over a memory store loaded from `scenario`.
pub struct TestApp {
    pub router: Router,
    pub engine: Arc<QuizEngine>,
    pub transport: Arc<RecordingTransport>,
}

impl TestApp {
    /// A fresh router over the shared engine; `oneshot` consumes routers.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full app router the way `main.rs` does, with a fixed clock and
/// a recording transport.
pub async fn build_test_app(scenario: &str) -> TestApp {
    let transport = Arc::new(RecordingTransport::new());
    let engine = Arc::new(QuizEngine::new(
        Arc::new(MemoryRepository::new()),
        fixed_clock(),
        Arc::new(MechanicRegistry::standard()),
        transport.clone(),
        EngineSettings {
            scenario_path: scenario_file(scenario),
            send_delay: Duration::ZERO,
            ..EngineSettings::default()
        },
    ));
    engine.load_scenario().await.unwrap();

    TestApp {
        router: build_router(AppState::new(engine.clone())),
        engine,
        transport,
    }
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
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

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
