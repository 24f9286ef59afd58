//! Health check endpoint.

use axum::Json;
use command_server::SERVER_NAME;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// GET /health: liveness of the server process.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVER_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}
