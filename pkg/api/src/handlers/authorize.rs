use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};

use crate::AppState;
use crate::response::{failure, success};
use pkg_types::api::{AuthRequest, AuthResponse};
use pkg_types::validate::validate_auth_request;

/// POST /rbac/v1/auth/check
///
/// A denial is an ordinary answer: 200 with `authorized: false`.
pub async fn check(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return failure(
                StatusCode::BAD_REQUEST,
                "invalid request body",
                rejection.body_text(),
            );
        }
    };
    if let Err(e) = validate_auth_request(&req) {
        return failure(StatusCode::BAD_REQUEST, "invalid request body", e);
    }

    let authorized = state.rbac.authorize(&req).await;
    let message = if authorized {
        "authorization successful"
    } else {
        "authorization denied"
    };
    success(StatusCode::OK, message, AuthResponse { authorized })
}
