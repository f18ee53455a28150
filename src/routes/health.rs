use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    pub discovery: String,
    pub redis: String,
    pub generative: String,
}

/// Health check endpoint - public
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    // Probe collaborators in parallel
    let (discovery_result, redis_result) = tokio::join!(
        state.discovery.health_check(),
        state.last_query.health_check(),
    );

    let discovery_status = if discovery_result.is_ok() { "ok" } else { "error" };
    let redis_status = if redis_result.is_ok() { "ok" } else { "error" };
    // The generative provider has no cheap probe; configured-or-not is
    // the only local signal
    let generative_status = if state.summarizer.is_configured() {
        "configured"
    } else {
        "unconfigured"
    };

    // Discovery is critical; Redis and the generative provider only
    // degrade the experience
    let status = if discovery_result.is_ok() && redis_result.is_ok() {
        "healthy"
    } else if discovery_result.is_ok() {
        "degraded"
    } else {
        "unhealthy"
    };

    let status_code = if status == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceHealth {
                discovery: discovery_status.to_string(),
                redis: redis_status.to_string(),
                generative: generative_status.to_string(),
            },
        }),
    )
}
