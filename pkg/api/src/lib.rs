pub mod handlers;
pub mod request_id;
pub mod response;
pub mod server;

use std::sync::Arc;

use pkg_rbac::RbacSystem;

/// Shared application state injected into all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub rbac: Arc<RbacSystem>,
}
