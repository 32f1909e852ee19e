//! Health check endpoints.

use crate::{error::ApiResult, responses::ApiResponse, state::AppState};
use axum::{extract::State, routing::get, Router};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Readiness check response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,

    /// Complaint store reachable
    pub store: bool,
}

/// Health check routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}

/// Liveness: the process is up
async fn health() -> ApiResponse<HealthResponse> {
    ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness: the backing store answers
async fn ready(State(state): State<AppState>) -> ApiResult<ApiResponse<ReadinessResponse>> {
    state.queries.ready().await?;
    Ok(ApiResponse::success(ReadinessResponse {
        ready: true,
        store: true,
    }))
}
