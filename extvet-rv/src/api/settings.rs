//! Provider settings endpoints
//!
//! GET /api/settings/providers, POST /api/settings/provider

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::AppState;

/// GET /api/settings/providers response
#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    /// Names the factory can construct
    pub providers: Vec<&'static str>,
    /// Active provider, if one is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<&'static str>,
}

/// POST /api/settings/provider body
#[derive(Debug, Deserialize)]
pub struct ConfigureProviderRequest {
    pub provider: String,
    pub api_key: String,
}

/// POST /api/settings/provider response
#[derive(Debug, Serialize)]
pub struct ConfigureProviderResponse {
    pub status: String,
    pub provider: &'static str,
}

/// GET /api/settings/providers
pub async fn list_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        providers: state.registry.available(),
        active: state.registry.active_name().await,
    })
}

/// POST /api/settings/provider
///
/// Activate a provider by name with an explicit credential. A blank key or
/// unknown name answers 400 with the validation message.
pub async fn configure_provider(
    State(state): State<AppState>,
    Json(request): Json<ConfigureProviderRequest>,
) -> ApiResult<Json<ConfigureProviderResponse>> {
    let provider = state
        .registry
        .configure(&request.provider, &request.api_key)
        .await?;

    Ok(Json(ConfigureProviderResponse {
        status: "configured".to_string(),
        provider,
    }))
}

/// Build settings routes
pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/api/settings/providers", get(list_providers))
        .route("/api/settings/provider", post(configure_provider))
}
