//! Integration tests for grading endpoints.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use quiz_client::api::GradingService;
use quiz_client::stream::envelope::Envelope;
use quiz_client::AppError;

use super::test_helpers::{event_stream, spawn_backend, test_client};

#[tokio::test]
async fn grade_session_returns_result() {
    let router = Router::new().route(
        "/grade/session/{id}",
        post(|| async {
            Json(json!({
                "percentage": 75.0,
                "total_points": 4,
                "points_earned": 3,
                "summary": "Solid",
                "improvements": ["Review limiting reagents"]
            }))
        }),
    );
    let base = spawn_backend(router).await;
    let service = GradingService::new(test_client(&base));

    let result = service.grade_session("s-1").await.expect("graded");
    assert!((result.percentage - 75.0).abs() < f64::EPSILON);
    assert_eq!(result.points_earned, 3);
    assert_eq!(result.improvements, vec!["Review limiting reagents"]);
}

#[tokio::test]
async fn grade_question_returns_auto_grade() {
    let router = Router::new().route(
        "/grade/question/{id}",
        post(|| async {
            Json(json!({
                "is_correct": false,
                "points_earned": 0,
                "max_points": 1,
                "explanation": "The answer is B",
                "correct_answer": "B"
            }))
        }),
    );
    let base = spawn_backend(router).await;
    let service = GradingService::new(test_client(&base));

    let grade = service.grade_question("q-1").await.expect("graded");
    assert!(!grade.is_correct);
    assert_eq!(grade.correct_answer, "B");
}

#[tokio::test]
async fn unanswered_question_is_http_error() {
    let router = Router::new().route(
        "/grade/question/{id}",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "Question has not been answered" })),
            )
                .into_response()
        }),
    );
    let base = spawn_backend(router).await;
    let service = GradingService::new(test_client(&base));

    let err = service.grade_question("q-1").await.expect_err("rejected");
    assert_eq!(err.to_string(), "Question has not been answered");
}

#[tokio::test]
async fn free_response_forwards_progress_until_final() {
    let router = Router::new().route(
        "/grade/free-response/{id}",
        post(|| async {
            event_stream(&[
                "data: {\"status\":\"started\",\"step\":\"grade\",\"message\":\"Grading answer\"}\n\n",
                ": keep-alive\n\n",
                "data: {\"status\":\"final\",\"data\":{\"points_earned\":2}}\n\n",
            ])
        }),
    );
    let base = spawn_backend(router).await;
    let service = GradingService::new(test_client(&base));

    let mut statuses = Vec::new();
    service
        .grade_free_response("q-2", |env: &Envelope| {
            statuses.push(env.status().unwrap_or_default().to_owned());
        })
        .await
        .expect("grading finished");

    assert_eq!(statuses, vec!["started", "final"]);
}

#[tokio::test]
async fn free_response_error_envelope_rejects() {
    let router = Router::new().route(
        "/grade/free-response/{id}",
        post(|| async {
            event_stream(&["data: {\"status\":\"error\",\"message\":\"Grader unavailable\"}\n\n"])
        }),
    );
    let base = spawn_backend(router).await;
    let service = GradingService::new(test_client(&base));

    let err = service
        .grade_free_response("q-2", |_: &Envelope| {})
        .await
        .expect_err("error envelope");
    assert!(matches!(err, AppError::Protocol(ref msg) if msg == "Grader unavailable"));
}
