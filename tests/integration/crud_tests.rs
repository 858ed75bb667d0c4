//! Integration tests for the single-shot JSON endpoints and `ApiClient` verbs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use quiz_client::api::{ApiClient, QuestionService, UserService};
use quiz_client::models::question::{AnswerValue, StudentAnswer};
use quiz_client::models::user::Credentials;
use quiz_client::stream::framing::Framing;
use quiz_client::AppError;

use super::test_helpers::{spawn_backend, test_client, test_config};

fn credentials() -> Credentials {
    Credentials {
        email: "student@example.com".into(),
        password: "hunter2".into(),
    }
}

// ── Users ────────────────────────────────────────────────────

#[tokio::test]
async fn user_lifecycle() {
    let router = Router::new()
        .route(
            "/users/create",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "id": "u-1",
                    "email": body["email"],
                    "session_ids": [],
                    "created_at": "2025-01-10T12:00:00"
                }))
            }),
        )
        .route(
            "/users/login",
            post(|| async {
                Json(json!({
                    "user_id": "u-1",
                    "email": "student@example.com",
                    "message": "Login successful"
                }))
            }),
        )
        .route(
            "/users/{id}",
            get(|Path(id): Path<String>| async move {
                Json(json!({
                    "id": id,
                    "email": "student@example.com",
                    "session_ids": ["s-1", "s-2"],
                    "created_at": "2025-01-10T12:00:00"
                }))
            }),
        )
        .route(
            "/users/{id}/sessions",
            get(|| async { Json(json!(["s-1", "s-2"])) }),
        );
    let base = spawn_backend(router).await;
    let service = UserService::new(test_client(&base));

    let created = service.create_user(&credentials()).await.expect("created");
    assert_eq!(created.email, "student@example.com");
    assert!(created.session_ids.is_empty());

    let login = service.login(&credentials()).await.expect("logged in");
    assert_eq!(login.user_id, "u-1");

    let user = service.get_user("u-1").await.expect("user");
    assert_eq!(user.session_ids.len(), 2);

    let sessions = service.get_user_sessions("u-1").await.expect("sessions");
    assert_eq!(sessions, vec!["s-1", "s-2"]);
}

#[tokio::test]
async fn bad_login_surfaces_detail() {
    let router = Router::new().route(
        "/users/login",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": "Invalid email or password" })),
            )
                .into_response()
        }),
    );
    let base = spawn_backend(router).await;
    let service = UserService::new(test_client(&base));

    match service.login(&credentials()).await {
        Err(AppError::Http { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("expected http error, got {other:?}"),
    }
}

// ── Questions ────────────────────────────────────────────────

#[tokio::test]
async fn save_answer_posts_answer_value() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let router = Router::new()
        .route(
            "/questions/{id}",
            get(|Path(id): Path<String>| async move {
                Json(json!({
                    "id": id,
                    "question": {
                        "data": { "type": "mcq", "choices": ["A", "B"], "answer": "B" },
                        "text": "Pick one",
                        "subject": "math",
                        "topic": "sets",
                        "difficulty": "hard"
                    },
                    "is_completed": true,
                    "points": 3,
                    "points_earned": 3
                }))
            }),
        )
        .route(
            "/questions/{id}/save-answer",
            post(move |Json(body): Json<Value>| {
                let sink = Arc::clone(&sink);
                async move {
                    *sink.lock().unwrap() = Some(body);
                    Json(json!({ "message": "Answer saved" }))
                }
            }),
        );
    let base = spawn_backend(router).await;
    let service = QuestionService::new(test_client(&base));

    let question = service.get_question("q-9").await.expect("question");
    assert_eq!(question.id, "q-9");
    assert_eq!(question.points_earned, Some(3));

    let saved = service
        .save_answer(
            "q-9",
            &StudentAnswer {
                answer: AnswerValue::List(vec!["b".into(), "a".into()]),
            },
        )
        .await
        .expect("saved");
    assert_eq!(saved.message, "Answer saved");
    assert_eq!(
        seen.lock().unwrap().take().expect("body captured"),
        json!({ "answer": ["b", "a"] })
    );
}

// ── Raw client verbs ─────────────────────────────────────────

#[tokio::test]
async fn empty_success_body_decodes_as_empty_object() {
    let router = Router::new().route("/ping", post(|| async { StatusCode::NO_CONTENT }));
    let base = spawn_backend(router).await;
    let client = test_client(&base);

    let value: Value = client.post::<(), _>("/ping", None).await.expect("empty body");
    assert_eq!(value, json!({}));

    let map: HashMap<String, String> = client.post::<(), _>("/ping", None).await.expect("empty body");
    assert!(map.is_empty());
}

#[tokio::test]
async fn put_and_delete_use_their_methods() {
    let router = Router::new().route(
        "/items/{id}",
        axum::routing::put(|Json(body): Json<Value>| async move { Json(json!({ "put": body })) })
            .delete(|| async { Json(json!({ "deleted": true })) }),
    );
    let base = spawn_backend(router).await;
    let client = test_client(&base);

    let put: Value = client
        .put("/items/1", Some(&json!({ "n": 1 })))
        .await
        .expect("put");
    assert_eq!(put, json!({ "put": { "n": 1 } }));

    let deleted: Value = client.delete("/items/1").await.expect("delete");
    assert_eq!(deleted["deleted"], true);
}

#[tokio::test]
async fn error_without_detail_uses_status_reason() {
    let router = Router::new().route(
        "/broken",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down").into_response() }),
    );
    let base = spawn_backend(router).await;
    let client = test_client(&base);

    let err = client.get::<Value>("/broken").await.expect_err("503");
    assert_eq!(err.to_string(), "Service Unavailable");
}

#[tokio::test]
async fn mismatched_body_is_decode_error() {
    let router = Router::new().route("/users/{id}", get(|| async { Json(json!({ "id": 5 })) }));
    let base = spawn_backend(router).await;
    let service = UserService::new(test_client(&base));

    let err = service.get_user("u-1").await.expect_err("bad shape");
    assert!(matches!(err, AppError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn configured_headers_are_sent() {
    let seen: Arc<Mutex<Option<HeaderMap>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let router = Router::new().route(
        "/echo",
        get(move |headers: HeaderMap| {
            let sink = Arc::clone(&sink);
            async move {
                *sink.lock().unwrap() = Some(headers);
                Json(json!({}))
            }
        }),
    );
    let base = spawn_backend(router).await;

    let mut config = test_config(&base, Framing::Chunk);
    config.headers.insert("x-client".into(), "cli".into());
    let client = ApiClient::new(&config).expect("client builds");

    let _: Value = client.get("/echo").await.expect("echo");
    let headers = seen.lock().unwrap().take().expect("headers captured");
    assert_eq!(headers.get("x-client").unwrap(), "cli");
    assert_eq!(client.url("/echo"), format!("{base}/echo"));
}

#[test]
fn invalid_header_name_is_config_error() {
    let mut config = test_config("http://127.0.0.1:1", Framing::Chunk);
    config.headers.insert("bad header".into(), "x".into());
    assert!(matches!(ApiClient::new(&config), Err(AppError::Config(_))));
}
