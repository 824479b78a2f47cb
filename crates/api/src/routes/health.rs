//! Health check endpoints.

use axum::{Router, response::Response, routing::get};
use serde::Serialize;

use crate::AppState;
use crate::response::ok;

/// Health check payload.
#[derive(Serialize)]
struct HealthData {
    status: &'static str,
    version: &'static str,
}

/// Health check handler.
async fn health_check() -> Response {
    ok(
        "Service is healthy",
        HealthData {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
