use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::AppState;
use crate::handlers::{authorize, health, rbac};
use crate::request_id::request_id_middleware;
use pkg_constants::network::API_PREFIX;
use pkg_rbac::RbacSystem;
use pkg_rbac::seed::seed_defaults;
use pkg_state::client::StateStore;

/// Server configuration passed from the binary's CLI.
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub data_dir: String,
    /// Keep state in memory only; nothing survives a restart.
    pub ephemeral: bool,
    pub seed_defaults: bool,
}

/// Control API routes, nested under `/rbac/v1`.
pub fn build_router(state: AppState) -> Router {
    let rbac_routes = Router::new()
        .route("/role", post(rbac::create_role).get(rbac::list_roles))
        .route(
            "/rolebinding",
            post(rbac::create_role_binding).get(rbac::list_role_bindings),
        )
        .route("/auth/check", post(authorize::check))
        .route("/health", get(health::health_check));

    Router::new()
        .nest(API_PREFIX, rbac_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let store = if config.ephemeral {
        warn!("Running with an in-memory state store; nothing will be persisted");
        StateStore::in_memory().await?
    } else {
        StateStore::new(&config.data_dir).await?
    };

    // The store is the source of truth; rebuild the cache before serving.
    let rbac = Arc::new(RbacSystem::new(Arc::new(store.clone())));
    rbac.load_initial_data().await?;
    if config.seed_defaults {
        seed_defaults(&rbac).await?;
    }

    let app = build_router(AppState { rbac });

    info!("Starting RBAC API server on {}", config.addr);
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
