use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;
use tracing::warn;

use crate::AppState;
use crate::response::{failure, success};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// GET /rbac/v1/health: liveness of the backing state store.
pub async fn health_check(State(state): State<AppState>) -> Response {
    match state.rbac.health().await {
        Ok(()) => success(
            StatusCode::OK,
            "rbac system is healthy",
            HealthStatus { status: "ok" },
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            failure(
                StatusCode::SERVICE_UNAVAILABLE,
                "rbac system is not healthy",
                e,
            )
        }
    }
}
