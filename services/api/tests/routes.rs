//! REST surface tests, driven through the router without a network listener.

use api_lib::adapters::{GeminiAdapter, MemorySettingsStore};
use api_lib::config::Config;
use api_lib::web::rest::{CreateSessionResponse, SettingsResponse};
use api_lib::web::{build_router, AppState};
use auramind_core::{ConfigResolver, PortError, VideoReference};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const BODY_LIMIT: usize = 1_048_576;

fn app_state(default_key: Option<&str>) -> Arc<AppState> {
    let config = Config::from_lookup(|_| None).unwrap();
    let model_service = Arc::new(GeminiAdapter::new(
        reqwest::Client::new(),
        config.gemini_api_base,
    ));
    let resolver = ConfigResolver::new(
        default_key.map(str::to_string),
        Arc::new(MemorySettingsStore::default()),
    );
    Arc::new(AppState::new(model_service, resolver))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.expect("router call");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), BODY_LIMIT)
        .await
        .expect("body bytes");
    (status, bytes.to_vec())
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).expect("json body")
}

#[tokio::test]
async fn youtube_session_is_registered_once() {
    let state = app_state(None);
    let app = build_router(state.clone());

    let (status, body) = call(
        &app,
        json_request(
            "POST",
            "/sessions",
            json!({ "youtube_url": "https://youtu.be/dQw4w9WgXcQ" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let created: CreateSessionResponse = decode(&body);
    assert_eq!(created.video_type, "youtube");
    assert_eq!(created.video_id.as_deref(), Some("dQw4w9WgXcQ"));

    let claimed = state.claim_session(created.session_id).await;
    assert!(matches!(claimed, Ok(VideoReference::YouTube { ref video_id, .. }) if video_id == "dQw4w9WgXcQ"));
    assert!(matches!(
        state.claim_session(created.session_id).await,
        Err(PortError::NotFound(_))
    ));
}

#[tokio::test]
async fn upload_session_has_no_video_id() {
    let app = build_router(app_state(None));

    let (status, body) = call(
        &app,
        json_request("POST", "/sessions", json!({ "file_name": "lecture.mp4" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let body: Value = decode(&body);
    assert_eq!(body["video_type"], "upload");
    assert!(body.get("video_id").is_none());
}

#[tokio::test]
async fn invalid_session_requests_are_rejected() {
    let app = build_router(app_state(None));

    let (status, body) = call(
        &app,
        json_request("POST", "/sessions", json!({ "youtube_url": "https://vimeo.com/1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        String::from_utf8(body).unwrap(),
        "Invalid YouTube URL. Please check and try again."
    );

    let (status, _) = call(&app, json_request("POST", "/sessions", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settings_round_trip_through_the_api() {
    let app = build_router(app_state(None));

    let (status, body) = call(
        &app,
        Request::builder().uri("/settings").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let settings: SettingsResponse = decode(&body);
    assert!(!settings.has_api_key);
    assert_eq!(settings.api_key_source, "none");
    assert_eq!(settings.model, "gemini-pro");
    assert_eq!(settings.available_models.len(), 3);

    let (status, _) = call(
        &app,
        json_request("PUT", "/settings/api-key", json!({ "api_key": "my-key" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(
        &app,
        json_request("PUT", "/settings/model", json!({ "model": "gemini-1.5-pro" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = call(
        &app,
        Request::builder().uri("/settings").body(Body::empty()).unwrap(),
    )
    .await;
    let settings: SettingsResponse = decode(&body);
    assert!(settings.has_api_key);
    assert_eq!(settings.api_key_source, "stored");
    assert_eq!(settings.model, "gemini-1.5-pro");
    assert!(!String::from_utf8(body).unwrap().contains("my-key"));
}

#[tokio::test]
async fn settings_validation_errors_are_bad_requests() {
    let app = build_router(app_state(Some("deployment-key")));

    let (status, body) = call(
        &app,
        json_request("PUT", "/settings/api-key", json!({ "api_key": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(String::from_utf8(body).unwrap(), "Please enter a valid API key");

    let (status, _) = call(
        &app,
        json_request("PUT", "/settings/model", json!({ "model": "gpt-4o" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = call(
        &app,
        Request::builder().uri("/settings").body(Body::empty()).unwrap(),
    )
    .await;
    let settings: SettingsResponse = decode(&body);
    assert_eq!(settings.api_key_source, "default");
}

#[tokio::test]
async fn openapi_document_lists_the_routes() {
    let app = build_router(app_state(None));

    let (status, body) = call(
        &app,
        Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let doc: Value = decode(&body);
    for path in ["/sessions", "/settings", "/settings/api-key", "/settings/model"] {
        assert!(doc["paths"].get(path).is_some(), "missing {path}");
    }
}
