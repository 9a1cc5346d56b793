//! Health check endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health: liveness only, the store is not checked.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
