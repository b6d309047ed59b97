use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::IntoResponse,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use chatrelay_api::{build_router, config::Config, error::ApiError, state::AppState};
use chatrelay_backend::{
    BackendError, GenerationBackend, GenerationReply, GenerationRequest, LookupEntry, LookupRequest,
    ResourceLookup,
};
use chatrelay_persist::InMemorySessionStore;
use chatrelay_relay::{ConversationRelay, RelayError};

const TEST_CONFIG: &str = r#"
    [server]
    host = "127.0.0.1"
    port = 0

    [cors]
    enabled = true
    origins = ["*"]

    [storage]
    kind = "memory"

    [mongodb]
    timeout_ms = 1000

    [backend]
    generation_url = "http://unused/generate"
    timeout_ms = 1000
    health_timeout_ms = 100

    [lookup]
    enabled = true
    url = "http://unused/lookup"
    timeout_ms = 1000

    [logging]
    level = "warn"
    format = "pretty"
"#;

#[derive(Clone, Copy)]
enum Backend {
    Healthy,
    Down,
    Failing,
}

#[async_trait]
impl GenerationBackend for Backend {
    async fn generate(&self, request: &GenerationRequest) -> chatrelay_backend::Result<GenerationReply> {
        match self {
            Backend::Healthy => Ok(GenerationReply::text(format!("echo: {}", request.prompt))
                .with_title("Brake noise")
                .with_references(vec!["Brake pad".into(), "Caliper".into()])),
            Backend::Down => Err(BackendError::Unavailable("connection refused".into())),
            Backend::Failing => Err(BackendError::Failed("HTTP 500".into())),
        }
    }

    async fn check_health(&self) -> chatrelay_backend::Result<()> {
        match self {
            Backend::Down => Err(BackendError::Unavailable("connection refused".into())),
            _ => Ok(()),
        }
    }
}

struct PartsLookup;

#[async_trait]
impl ResourceLookup for PartsLookup {
    async fn lookup(&self, request: &LookupRequest) -> chatrelay_backend::Result<Vec<LookupEntry>> {
        Ok(request
            .names
            .iter()
            .map(|name| LookupEntry {
                name: name.clone(),
                url: (name == "Brake pad").then(|| "https://parts.example/pad".to_string()),
            })
            .collect())
    }
}

fn app(backend: Backend) -> Router {
    let config: Config = toml::from_str(TEST_CONFIG).unwrap();
    let (relay, listing) = ConversationRelay::builder()
        .store(Arc::new(InMemorySessionStore::new()))
        .generation(Arc::new(backend))
        .with_lookup(Arc::new(PartsLookup))
        .build()
        .unwrap();

    build_router(Arc::new(AppState::new(config, relay, listing)))
}

async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    send(app, path, body.to_string()).await
}

async fn send(app: &Router, path: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn new_session(app: &Router, user: &str) -> String {
    let (status, body) = post(app, "/api/new", json!({ "userId": user, "message": "hello" })).await;
    assert_eq!(status, StatusCode::CREATED);
    body["sessionId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_then_history_is_empty() {
    let app = app(Backend::Healthy);
    let sid = new_session(&app, "alice").await;

    let (status, body) = post(&app, "/api/history", json!({ "userId": "alice", "sessionId": sid })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["conversation"], json!([]));
}

#[tokio::test]
async fn test_message_round() {
    let app = app(Backend::Healthy);
    let sid = new_session(&app, "alice").await;

    let (status, body) = post(
        &app,
        "/api/message",
        json!({ "userId": "alice", "sessionId": sid, "message": "brakes squeal" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["response"], "echo: brakes squeal");
    assert_eq!(body["title"], "Brake noise");
    assert_eq!(body["urls"], json!([{ "name": "Brake pad", "url": "https://parts.example/pad" }]));
    assert!(body.get("warning").is_none());

    let (_, history) = post(&app, "/api/history", json!({ "userId": "alice", "sessionId": sid })).await;
    let conversation = history["conversation"].as_array().unwrap();
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation[0]["sender"], "user");
    assert_eq!(conversation[1]["sender"], "bot");
    assert!(conversation[1]["timestamp"].is_string());

    let (_, chats) = post(&app, "/api/chats", json!({ "userId": "alice" })).await;
    assert_eq!(chats["chatList"], json!([{ "sessionId": sid, "title": "Brake noise" }]));
    assert_eq!(chats["offset"], 1);
}

#[tokio::test]
async fn test_create_with_backend_down_is_503() {
    let app = app(Backend::Down);

    let (status, body) = post(&app, "/api/new", json!({ "userId": "alice", "message": "hi" })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["retryable"], false);

    let (_, chats) = post(&app, "/api/chats", json!({ "userId": "alice", "offset": 0 })).await;
    assert_eq!(chats["chatList"], json!([]));
}

#[tokio::test]
async fn test_generation_failure_is_retryable_500() {
    let app = app(Backend::Failing);
    let sid = new_session(&app, "alice").await;

    let (status, body) = post(
        &app,
        "/api/message",
        json!({ "userId": "alice", "sessionId": sid, "message": "hi" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["retryable"], true);

    let (_, history) = post(&app, "/api/history", json!({ "userId": "alice", "sessionId": sid })).await;
    assert_eq!(history["conversation"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_bad_requests_are_400() {
    let app = app(Backend::Healthy);

    let (status, body) = send(&app, "/api/new", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = post(&app, "/api/new", json!({ "message": "hi" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("userId"));

    let (status, _) = post(&app, "/api/chats", json!({ "userId": "alice", "offset": -5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&app, "/api/history", json!({ "userId": "alice" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rename_and_delete() {
    let app = app(Backend::Healthy);
    let sid = new_session(&app, "alice").await;

    let (status, body) = post(
        &app,
        "/api/title",
        json!({ "userId": "alice", "sessionId": sid, "title": "My Civic" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "My Civic");

    let (_, reply) = post(
        &app,
        "/api/message",
        json!({ "userId": "alice", "sessionId": sid, "message": "hi" }),
    )
    .await;
    assert_eq!(reply["title"], "My Civic");

    let (status, body) = post(&app, "/api/delete", json!({ "userId": "alice", "sessionId": sid })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], sid);

    let (status, body) = post(&app, "/api/delete", json!({ "userId": "alice", "sessionId": sid })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_other_users_session_is_not_found() {
    let app = app(Backend::Healthy);
    let sid = new_session(&app, "alice").await;

    let (status, _) = post(&app, "/api/history", json!({ "userId": "mallory", "sessionId": sid })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_dependencies() {
    let app = app(Backend::Down);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["store"], "connected");
    assert_eq!(body["services"]["generation"], "unavailable");
}

#[tokio::test]
async fn test_api_error_response() {
    let error = ApiError::BadRequest("Test error".to_string());
    assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);

    let error = ApiError::from(RelayError::BackendUnavailable("down".to_string()));
    assert_eq!(error.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
}
