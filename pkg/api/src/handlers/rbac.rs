use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::response::{failure, rbac_failure, success};
use pkg_types::meta::Object;
use pkg_types::rbac::{Role, RoleBinding};
use pkg_types::validate::{validate_object, validate_role_binding};

/// Query parameters for listing resources.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub namespace: Option<String>,
}

impl ListQuery {
    /// `?namespace=` with an empty value lists every namespace.
    fn filter(&self) -> Option<&str> {
        self.namespace.as_deref().filter(|ns| !ns.is_empty())
    }
}

// ============================================================
// Roles
// ============================================================

/// POST /rbac/v1/role
pub async fn create_role(
    State(state): State<AppState>,
    payload: Result<Json<Role>, JsonRejection>,
) -> Response {
    let mut role = match payload {
        Ok(Json(role)) => role,
        Err(rejection) => {
            return failure(StatusCode::BAD_REQUEST, "Invalid role data", rejection.body_text());
        }
    };
    role.apply_defaults();
    if let Err(e) = validate_object(&role) {
        return failure(StatusCode::BAD_REQUEST, "Invalid role data", e);
    }

    match state.rbac.create_role(role).await {
        Ok(created) => success(StatusCode::CREATED, "Role created successfully", created),
        Err(e) => rbac_failure(e),
    }
}

/// GET /rbac/v1/role
pub async fn list_roles(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let roles = state.rbac.list_roles(query.filter()).await;
    info!("Listing {} roles", roles.len());
    success(StatusCode::OK, "Roles retrieved successfully", roles)
}

// ============================================================
// RoleBindings
// ============================================================

/// POST /rbac/v1/rolebinding
pub async fn create_role_binding(
    State(state): State<AppState>,
    payload: Result<Json<RoleBinding>, JsonRejection>,
) -> Response {
    let mut rb = match payload {
        Ok(Json(rb)) => rb,
        Err(rejection) => {
            return failure(
                StatusCode::BAD_REQUEST,
                "Invalid role binding data",
                rejection.body_text(),
            );
        }
    };
    rb.apply_defaults();
    if let Err(e) = validate_role_binding(&rb) {
        return failure(StatusCode::BAD_REQUEST, "Invalid role binding data", e);
    }

    match state.rbac.create_role_binding(rb).await {
        Ok(created) => success(
            StatusCode::CREATED,
            "Role binding created successfully",
            created,
        ),
        Err(e) => rbac_failure(e),
    }
}

/// GET /rbac/v1/rolebinding
pub async fn list_role_bindings(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let bindings = state.rbac.list_role_bindings(query.filter()).await;
    info!("Listing {} role bindings", bindings.len());
    success(
        StatusCode::OK,
        "Role bindings retrieved successfully",
        bindings,
    )
}
