//! Integration tests for session creation and lookup.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use quiz_client::api::SessionService;
use quiz_client::models::session::{SearchRequest, SessionMode, SessionStatus};
use quiz_client::stream::envelope::Envelope;
use quiz_client::AppError;

use super::test_helpers::{event_stream, spawn_backend, test_client};

fn search_request() -> SearchRequest {
    SearchRequest {
        subject: "chemistry".into(),
        topics: vec!["stoichiometry".into()],
        num_questions_range: (2, 4),
        mode: SessionMode::Practice,
        special_instructions: Some("no calculators".into()),
        user_id: Some("u-1".into()),
    }
}

#[tokio::test]
async fn create_session_resolves_with_announced_id() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let router = Router::new().route(
        "/sessions/create",
        post(move |Json(body): Json<Value>| {
            let sink = Arc::clone(&sink);
            async move {
                *sink.lock().unwrap() = Some(body);
                event_stream(&[
                    "data: {\"status\":\"started\",\"step\":\"search\",\"message\":\"Searching sources\"}\n\n",
                    "data: {\"status\":\"question\",\"step\":\"generate\",\"data\":{\"text\":\"Q1\"}}\n\n",
                    "data: {\"status\":\"final\",\"step\":\"session\",\"session_id\":\"abc123\"}\n\n",
                ])
            }
        }),
    );
    let base = spawn_backend(router).await;
    let service = SessionService::new(test_client(&base));

    let mut steps = Vec::new();
    let session_id = service
        .create_session(&search_request(), |env: &Envelope| {
            steps.push(env.step().unwrap_or_default().to_owned());
        })
        .await
        .expect("session created");

    assert_eq!(session_id, "abc123");
    assert_eq!(steps, vec!["search", "generate", "session"]);

    let body = seen.lock().unwrap().take().expect("body captured");
    assert_eq!(body["num_questions_range"], json!([2, 4]));
    assert_eq!(body["mode"], "practice");
    assert_eq!(body["special_instructions"], "no calculators");
}

#[tokio::test]
async fn create_session_stays_pending_without_session_id() {
    let router = Router::new().route(
        "/sessions/create",
        post(|| async {
            event_stream(&["data: {\"status\":\"final\",\"message\":\"done\"}\n\n"])
        }),
    );
    let base = spawn_backend(router).await;
    let service = SessionService::new(test_client(&base));

    let request = search_request();
    let outcome = tokio::time::timeout(
        Duration::from_millis(300),
        service.create_session(&request, |_: &Envelope| {}),
    )
    .await;

    assert!(outcome.is_err(), "future must not settle");
}

#[tokio::test]
async fn create_session_rejects_on_error_envelope() {
    let router = Router::new().route(
        "/sessions/create",
        post(|| async {
            event_stream(&[
                "data: {\"status\":\"error\",\"step\":\"search\",\"message\":\"Search step failed\",\"error\":\"no results\"}\n\n",
            ])
        }),
    );
    let base = spawn_backend(router).await;
    let service = SessionService::new(test_client(&base));

    let err = service
        .create_session(&search_request(), |_: &Envelope| {})
        .await
        .expect_err("error envelope");

    assert!(matches!(err, AppError::Protocol(_)));
    assert_eq!(err.to_string(), "Search step failed: no results");
}

#[tokio::test]
async fn get_session_and_questions() {
    let router = Router::new()
        .route(
            "/sessions/{id}",
            get(|Path(id): Path<String>| async move {
                Json(json!({
                    "id": id,
                    "subject": "physics",
                    "topics": ["optics"],
                    "questions": ["q-1"],
                    "num_questions": 1,
                    "num_questions_answered": 0,
                    "status": "in_progress",
                    "created_at": "2025-01-10T12:00:00",
                    "mode": "test"
                }))
            }),
        )
        .route(
            "/sessions/{id}/questions",
            get(|| async {
                Json(json!({
                    "questions": [{
                        "id": "q-1",
                        "question": {
                            "data": { "type": "tf", "answer": true },
                            "text": "Light is a wave",
                            "subject": "physics",
                            "topic": "optics",
                            "difficulty": "easy"
                        }
                    }],
                    "count": 1
                }))
            }),
        );
    let base = spawn_backend(router).await;
    let service = SessionService::new(test_client(&base));

    let session = service.get_session("s-4").await.expect("session");
    assert_eq!(session.id, "s-4");
    assert_eq!(session.mode, SessionMode::Test);
    assert_eq!(session.status, SessionStatus::InProgress);
    assert!(!session.is_finished());

    let questions = service.get_session_questions("s-4").await.expect("questions");
    assert_eq!(questions.count, 1);
    assert_eq!(questions.questions[0].points, 1, "points default to one");
    assert_eq!(questions.questions[0].question.data.kind(), "tf");
}

#[tokio::test]
async fn missing_session_uses_detail_message() {
    let router = Router::new().route(
        "/sessions/{id}",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Session not found" })),
            )
                .into_response()
        }),
    );
    let base = spawn_backend(router).await;
    let service = SessionService::new(test_client(&base));

    match service.get_session("nope").await {
        Err(AppError::Http { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Session not found");
        }
        other => panic!("expected http error, got {other:?}"),
    }
}
