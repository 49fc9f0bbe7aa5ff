//! HTTP API tests
//!
//! 通过 actix_web::test 驱动完整的路由与中间件。

mod common;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::App;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;

use common::{FakeChat, FakeImages, FakeStore, plan_json, service_with, test_config};
use slideforge::api::middleware::RequestIdMiddleware;
use slideforge::api::{AppState, configure_app};
use slideforge::config::{Profile, StaticConfig};

const LONG_SUMMARY: &str = "A long enough summary about renewable energy adoption in cities.";

fn state_for(config: &StaticConfig, chat: Arc<FakeChat>) -> AppState {
    let service = service_with(config, chat, FakeImages::ok(), FakeStore::ok());
    AppState::new(config, Arc::new(service))
}

macro_rules! app {
    ($state:expr) => {{
        let state = $state;
        test::init_service(
            App::new()
                .configure(move |cfg| configure_app(cfg, state))
                .wrap(RequestIdMiddleware),
        )
        .await
    }};
}

fn post_json(body: Value) -> TestRequest {
    TestRequest::post().uri("/generate-ppt").set_json(body)
}

// =============================================================================
// Health
// =============================================================================

#[actix_web::test]
async fn test_root_reports_live() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let app = app!(state_for(&config, FakeChat::replying(plan_json(1))));

    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body, "Service is live ✅".as_bytes());
}

#[actix_web::test]
async fn test_health_reports_profile() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Enhanced, &dir);
    let app = app!(state_for(&config, FakeChat::replying(plan_json(1))));

    let body: Value =
        test::call_and_read_body_json(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["profile"], "enhanced");
    assert!(body["uptime"].is_u64());
    assert!(body["timestamp"].is_string());
}

// =============================================================================
// Request validation
// =============================================================================

#[actix_web::test]
async fn test_non_json_content_type_rejected() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let app = app!(state_for(&config, FakeChat::replying(plan_json(1))));

    let req = TestRequest::post()
        .uri("/generate-ppt")
        .insert_header(("content-type", "text/plain"))
        .set_payload("slide_count=3")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Content-Type must be application/json");
}

#[actix_web::test]
async fn test_invalid_fields_rejected() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let app = app!(state_for(&config, FakeChat::replying(plan_json(1))));

    let cases = [
        (json!({}), "JSON body required"),
        (json!({"slide_count": 0, "summary": "x"}), "Valid slide_count (int > 0) required"),
        (json!({"slide_count": 2, "summary": ""}), "Non-empty summary string required"),
    ];
    for (payload, expected) in cases {
        let resp = test::call_service(&app, post_json(payload).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], expected);
    }
}

#[actix_web::test]
async fn test_get_on_generate_not_allowed() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let app = app!(state_for(&config, FakeChat::replying(plan_json(1))));

    let resp =
        test::call_service(&app, TestRequest::get().uri("/generate-ppt").to_request()).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn test_oversized_payload_rejected() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(Profile::Classic, &dir);
    config.server.max_payload_bytes = 64;
    let app = app!(state_for(&config, FakeChat::replying(plan_json(1))));

    let summary = "word ".repeat(100);
    let resp = test::call_service(
        &app,
        post_json(json!({"slide_count": 2, "summary": summary})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// =============================================================================
// Generation
// =============================================================================

#[actix_web::test]
async fn test_generate_success_response() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let app = app!(state_for(&config, FakeChat::replying(plan_json(3))));

    let resp = test::call_service(
        &app,
        post_json(json!({"slide_count": 3, "summary": "Quarterly numbers"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Presentation generated successfully");
    assert_eq!(body["presentation_url"], body["url"]);
    assert_eq!(body["source"], "cloudinary");
    assert_eq!(body["slide_count"], 3);
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn test_generate_failure_carries_trace_id() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let app = app!(state_for(&config, FakeChat::failing("model unavailable")));

    let req = post_json(json!({"slide_count": 3, "summary": "Quarterly numbers"}))
        .insert_header(("x-request-id", "trace-abc-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"], "Presentation generation failed");
    assert!(body["details"].as_str().unwrap().contains("model unavailable"));
    assert_eq!(body["trace_id"], "trace-abc-123");
}

// =============================================================================
// API key
// =============================================================================

#[actix_web::test]
async fn test_fullscreen_requires_api_key() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(Profile::Fullscreen, &dir);
    config.auth.api_keys = vec!["key-one".into(), "key-two".into()];
    let app = app!(state_for(&config, FakeChat::replying(plan_json(2))));
    let payload = json!({"slide_count": 2, "summary": LONG_SUMMARY});

    let resp = test::call_service(&app, post_json(payload.clone()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"], "Invalid or missing API key");

    let resp = test::call_service(
        &app,
        post_json(payload.clone())
            .insert_header(("X-API-KEY", "key-three"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(
        &app,
        post_json(payload)
            .insert_header(("X-API-KEY", "key-two"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_fullscreen_without_keys_rejects_everything() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Fullscreen, &dir);
    let app = app!(state_for(&config, FakeChat::replying(plan_json(2))));

    let resp = test::call_service(
        &app,
        post_json(json!({"slide_count": 2, "summary": LONG_SUMMARY}))
            .insert_header(("X-API-KEY", ""))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_configured_keys_enforced_in_classic() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(Profile::Classic, &dir);
    config.auth.api_keys = vec!["secret".into()];
    let app = app!(state_for(&config, FakeChat::replying(plan_json(1))));

    let resp = test::call_service(
        &app,
        post_json(json!({"slide_count": 1, "summary": "short"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // 健康检查不受 API Key 影响
    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_fullscreen_summary_minimum() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(Profile::Fullscreen, &dir);
    config.auth.api_keys = vec!["k".into()];
    let app = app!(state_for(&config, FakeChat::replying(plan_json(2))));

    let resp = test::call_service(
        &app,
        post_json(json!({"slide_count": 2, "summary": "too short"}))
            .insert_header(("X-API-KEY", "k"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "summary must be at least 20 characters");
    assert_eq!(body["status"], "invalid_parameter");
}
