//! Extension request endpoints
//!
//! POST /api/requests submits a request through the decision pipeline and
//! returns the resolved record. GET /api/requests lists past decisions for
//! the review surface; POST /api/requests/:id/review applies an override.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::decision::{DecisionRecord, ReviewOutcome};
use crate::AppState;
use extvet_common::models::ExtensionRequest;

/// GET /api/requests response
#[derive(Debug, Serialize)]
pub struct RequestListResponse {
    pub count: usize,
    pub requests: Vec<DecisionRecord>,
}

/// POST /api/requests/:id/review body
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub outcome: ReviewOutcome,
    pub admin_notes: Option<String>,
}

/// POST /api/requests
///
/// Runs the decision pipeline for one extension request. Always answers 200
/// with a terminal decision for well-formed input; AI-path failures resolve
/// fail-closed rather than as HTTP errors.
pub async fn submit_request(
    State(state): State<AppState>,
    Json(request): Json<ExtensionRequest>,
) -> ApiResult<Json<DecisionRecord>> {
    tracing::info!(
        extension = %request.extension_name,
        user = %request.user_name,
        "Extension request submitted"
    );

    let record = state.engine.submit(request).await?;
    Ok(Json(record))
}

/// GET /api/requests
///
/// All recorded decisions, newest first.
pub async fn list_requests(State(state): State<AppState>) -> Json<RequestListResponse> {
    let requests = state.decision_log.list().await;
    Json(RequestListResponse {
        count: requests.len(),
        requests,
    })
}

/// POST /api/requests/:id/review
///
/// Apply a reviewer override to a recorded decision.
pub async fn review_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(review): Json<ReviewRequest>,
) -> ApiResult<Json<DecisionRecord>> {
    let record = state
        .decision_log
        .review(id, review.outcome, review.admin_notes)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Request {} not found", id)))?;

    tracing::info!(
        request_id = %id,
        status = %record.status,
        "Review override applied"
    );

    Ok(Json(record))
}

/// Build request routes
pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/api/requests", post(submit_request))
        .route("/api/requests", get(list_requests))
        .route("/api/requests/:id/review", post(review_request))
}
