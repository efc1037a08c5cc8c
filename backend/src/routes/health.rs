//! Liveness check

use axum::Json;
use schemars::JsonSchema;
use serde::Serialize;

/// Name reported by the health check
pub const SERVICE_NAME: &str = "affordable-it-resources";

/// Health check payload
#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    ok: bool,
    /// Service identifier
    service: String,
}

/// Health check endpoint
///
/// Answers without touching storage, so it stays green while storage is down.
#[allow(clippy::unused_async)]
pub async fn handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: SERVICE_NAME.to_string(),
    })
}
