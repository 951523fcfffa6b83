//! Health check handlers.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness body. The space is the only dependency.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub space: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ready once the prediction space answers its info endpoint.
pub async fn ready(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let client = state.relay.client();
    let start = Instant::now();

    let error = match client.health_check().await {
        Ok(true) => None,
        Ok(false) => Some("space unavailable".to_string()),
        Err(e) => Some(e.to_string()),
    };

    let (status, code) = match error {
        None => ("ready", StatusCode::OK),
        Some(_) => ("degraded", StatusCode::SERVICE_UNAVAILABLE),
    };

    let response = ReadinessResponse {
        status,
        space: client.base_url().to_string(),
        latency_ms: error
            .is_none()
            .then(|| start.elapsed().as_millis() as u64),
        error,
    };

    (code, Json(response))
}
