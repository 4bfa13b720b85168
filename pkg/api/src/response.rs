use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt::Display;
use tracing::warn;

use pkg_rbac::RbacError;
use pkg_types::api::ApiResponse;

/// `{success: true, message, data}` with the given status.
pub fn success<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (status, Json(ApiResponse::ok(message, data))).into_response()
}

/// `{success: false, message, error}` with the given status.
pub fn failure(status: StatusCode, message: &str, error: impl Display) -> Response {
    (
        status,
        Json(ApiResponse::<()>::failure(message, error.to_string())),
    )
        .into_response()
}

pub fn status_for(err: &RbacError) -> StatusCode {
    match err {
        RbacError::Conflict { .. } => StatusCode::CONFLICT,
        RbacError::RoleNotFound { .. } => StatusCode::NOT_FOUND,
        RbacError::Persistence { .. } | RbacError::Corrupt { .. } | RbacError::Load { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Render a cache write failure. Server-side failures are logged here.
pub fn rbac_failure(err: RbacError) -> Response {
    let status = status_for(&err);
    let message = match status {
        StatusCode::CONFLICT => "Resource already exists",
        StatusCode::NOT_FOUND => "Referenced role not found",
        _ => {
            warn!("RBAC write failed: {}", err);
            "Failed to save resource"
        }
    };
    failure(status, message, err)
}
