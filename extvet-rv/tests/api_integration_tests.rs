//! Integration tests for extvet-rv API endpoints
//!
//! Exercises the full router: request submission through the decision
//! pipeline, the review surface, and provider settings.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

use extvet_rv::services::providers::gemini::{
    Delay, GeminiProvider, GenerateError, TextGenerator,
};
use extvet_rv::services::providers::ProviderRegistry;
use extvet_rv::services::Catalog;
use extvet_rv::AppState;

/// Generator that replays scripted responses instead of calling the network
struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GenerateError>>>,
}

impl ScriptedGenerator {
    fn new(responses: Vec<Result<String, GenerateError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerateError::Network("script exhausted".to_string())))
    }
}

struct NoopDelay;

#[async_trait]
impl Delay for NoopDelay {
    async fn sleep(&self, _duration: Duration) {}
}

/// Test helper: app with the built-in catalog and no provider configured
fn create_test_app() -> axum::Router {
    let catalog = Catalog::builtin().expect("Failed to load built-in catalog");
    let registry = ProviderRegistry::new(None);
    let state = AppState::new(catalog, registry);
    extvet_rv::build_router(state)
}

/// Test helper: app with a Gemini provider driven by scripted responses
async fn create_app_with_scripted_model(
    responses: Vec<Result<String, GenerateError>>,
) -> axum::Router {
    let catalog = Catalog::builtin().expect("Failed to load built-in catalog");
    let registry = ProviderRegistry::new(None);
    let state = AppState::new(catalog, registry);

    let provider = GeminiProvider::from_parts(
        Box::new(ScriptedGenerator::new(responses)),
        Box::new(NoopDelay),
        StdRng::seed_from_u64(7),
    );
    state.registry.install(Arc::new(provider)).await;

    extvet_rv::build_router(state)
}

fn submission(extension_id: &str, extension_name: &str, category: &str) -> serde_json::Value {
    json!({
        "user_name": "Dana Smith",
        "email": "dana@example.com",
        "extension_name": extension_name,
        "extension_id": extension_id,
        "extension_category": category,
        "reason": "Needed for daily work"
    })
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "extvet-rv");
    assert_eq!(json["decisions_recorded"], 0);
}

#[tokio::test]
async fn test_build_info_endpoint() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/build_info")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["build_timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_submit_approved_extension_short_circuits() {
    let app = create_test_app();

    let body = submission(
        "cjpalhdlnbpafiamejdnhcphjbkeiagm",
        "uBlock Origin",
        "Privacy & Security",
    );
    let response = app.oneshot(post_json("/api/requests", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "approved");
    assert_eq!(
        json["message"],
        "Extension \"uBlock Origin\" is already approved and available for use."
    );
    assert!(json.get("recommendation").is_none());
}

#[tokio::test]
async fn test_submit_blocked_extension_reports_stored_description() {
    let app = create_test_app();

    let body = submission("malicious123456789", "Free VPN Super Fast", "Privacy & Security");
    let response = app.oneshot(post_json("/api/requests", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "blocked");
    let message = json["message"].as_str().unwrap();
    assert!(message.starts_with(
        "Extension \"Free VPN Super Fast\" is blocked due to security concerns."
    ));
    assert!(message.contains("Suspicious VPN extension with data harvesting"));
}

#[tokio::test]
async fn test_submit_without_provider_resolves_fail_closed() {
    let app = create_test_app();

    let body = submission("unlisted-extension-001", "Mystery Helper", "Other");
    let response = app
        .clone()
        .oneshot(post_json("/api/requests", &body))
        .await
        .unwrap();

    // Fail-closed is a decision, not an HTTP error
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "rejected");
    assert_eq!(
        json["message"],
        "An error occurred while processing your request. Please try again later."
    );

    // The rejection is recorded like any other decision
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/requests")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = response_json(response).await;
    assert_eq!(json["count"], 1);
}

#[tokio::test]
async fn test_submit_unlisted_with_model_produces_recommendation() {
    let analysis = r#"{
        "name": "Grammarly",
        "category": "Productivity",
        "rating": 4.5,
        "description": "Writing assistant",
        "functionality": "Grammar and spell checking",
        "useCase": "Improve writing quality",
        "users": 10000000,
        "lastUpdated": "2024-03-10"
    }"#;
    let similar = r#"{"alternatives": [{
        "name": "LanguageTool",
        "category": "Productivity",
        "rating": 4.4,
        "description": "Open-source grammar checker",
        "functionality": "Grammar checking",
        "useCase": "Improve writing quality",
        "users": 2000000
    }]}"#;
    let verdict = r#"{
        "isApproved": true,
        "reason": "High rating and large user base with no approved duplicates",
        "securityConcerns": []
    }"#;

    let app = create_app_with_scripted_model(vec![
        Ok(analysis.to_string()),
        Ok(similar.to_string()),
        Ok(verdict.to_string()),
    ])
    .await;

    let body = submission("grammarly-ext-001", "Grammarly", "Productivity");
    let response = app.oneshot(post_json("/api/requests", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "ai-analysis");
    assert_eq!(
        json["message"],
        "AI analysis completed. Please review the recommendation below."
    );

    let recommendation = &json["recommendation"];
    assert_eq!(recommendation["analysis_source"], "model");
    assert_eq!(recommendation["current_extension"]["name"], "Grammarly");
    assert_eq!(recommendation["current_extension"]["rating"], 4.5);
    assert_eq!(recommendation["verdict"]["approved"], true);
    assert_eq!(
        recommendation["similar_extensions"][0]["name"],
        "LanguageTool"
    );
}

#[tokio::test]
async fn test_submit_with_blank_extension_name_is_bad_request() {
    let app = create_test_app();

    let body = submission("some-id-001", "   ", "Other");
    let response = app.oneshot(post_json("/api/requests", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_list_requests_newest_first() {
    let app = create_test_app();

    let first = submission(
        "cjpalhdlnbpafiamejdnhcphjbkeiagm",
        "uBlock Origin",
        "Privacy & Security",
    );
    let second = submission("malicious123456789", "Free VPN Super Fast", "Privacy & Security");

    app.clone()
        .oneshot(post_json("/api/requests", &first))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_json("/api/requests", &second))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/requests")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["count"], 2);
    assert_eq!(
        json["requests"][0]["request"]["extension_name"],
        "Free VPN Super Fast"
    );
    assert_eq!(json["requests"][1]["request"]["extension_name"], "uBlock Origin");
}

#[tokio::test]
async fn test_review_override_updates_record() {
    let app = create_test_app();

    let body = submission("unlisted-extension-002", "Mystery Helper", "Other");
    let response = app
        .clone()
        .oneshot(post_json("/api/requests", &body))
        .await
        .unwrap();
    let record = response_json(response).await;
    assert_eq!(record["status"], "rejected");
    let id = record["id"].as_str().unwrap().to_string();

    let review = json!({
        "outcome": "approved",
        "admin_notes": "Verified with the vendor"
    });
    let response = app
        .oneshot(post_json(&format!("/api/requests/{}/review", id), &review))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "approved");
    assert_eq!(json["admin_notes"], "Verified with the vendor");
    assert!(json["reviewed_at"].as_str().is_some());
}

#[tokio::test]
async fn test_review_unknown_id_is_not_found() {
    let app = create_test_app();

    let review = json!({"outcome": "rejected"});
    let response = app
        .oneshot(post_json(
            "/api/requests/00000000-0000-0000-0000-000000000000/review",
            &review,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = response_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_providers() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/settings/providers")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["providers"], json!(["gemini", "openai"]));
    assert!(json.get("active").is_none());
}

#[tokio::test]
async fn test_configure_provider_rejects_blank_key() {
    let app = create_test_app();

    let body = json!({"provider": "gemini", "api_key": "   "});
    let response = app
        .oneshot(post_json("/api/settings/provider", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert_eq!(
        json["error"]["message"],
        "API key is required for gemini provider"
    );
}

#[tokio::test]
async fn test_configure_provider_rejects_unknown_name() {
    let app = create_test_app();

    let body = json!({"provider": "claude", "api_key": "some-key"});
    let response = app
        .oneshot(post_json("/api/settings/provider", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Available providers: gemini, openai"));
}

#[tokio::test]
async fn test_configure_provider_activates_it() {
    let app = create_test_app();

    let body = json!({"provider": "gemini", "api_key": "test-key-123"});
    let response = app
        .clone()
        .oneshot(post_json("/api/settings/provider", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "configured");
    assert_eq!(json["provider"], "gemini");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/settings/providers")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = response_json(response).await;
    assert_eq!(json["active"], "gemini");
}
