#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

use pkg_api::AppState;
use pkg_api::server::build_router;
use pkg_rbac::RbacSystem;
use pkg_state::client::StateStore;
use pkg_state::store::KvStore;

pub async fn app() -> Router {
    let store = StateStore::in_memory().await.expect("store");
    app_with_store(Arc::new(store))
}

pub fn app_with_store(store: Arc<dyn KvStore>) -> Router {
    build_router(AppState {
        rbac: Arc::new(RbacSystem::new(store)),
    })
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

/// Send one request and return its status and decoded JSON body.
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(req).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json"))
}

pub fn role(name: &str, verbs: &[&str], resources: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "apiVersion": "rbac/v1",
        "kind": "Role",
        "metadata": { "name": name, "namespace": "default" },
        "rules": [{ "apiGroups": [""], "verbs": verbs, "resources": resources }]
    })
}

pub fn role_binding(name: &str, role: &str, subject: &str) -> serde_json::Value {
    serde_json::json!({
        "apiVersion": "rbac/v1",
        "kind": "RoleBinding",
        "metadata": { "name": name, "namespace": "default" },
        "roleRef": { "apiGroup": "rbac/v1", "kind": "Role", "name": role },
        "subjects": [{ "kind": "User", "name": subject }]
    })
}

pub fn check(name: &str, verb: &str, resource: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "verb": verb,
        "resource": resource,
        "namespace": "default"
    })
}

/// Accepts reads, refuses every write.
pub struct ReadOnlyStore;

#[async_trait]
impl KvStore for ReadOnlyStore {
    async fn put(&self, key: &str, _value: &[u8]) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("read-only store refused {}", key))
    }
    async fn get(&self, _key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(None)
    }
    async fn list_prefix(&self, _prefix: &str) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
        Ok(Vec::new())
    }
}

/// Every call fails, reads included.
pub struct UnreachableStore;

#[async_trait]
impl KvStore for UnreachableStore {
    async fn put(&self, _key: &str, _value: &[u8]) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn get(&self, _key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn list_prefix(&self, _prefix: &str) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
        Err(anyhow::anyhow!("connection refused"))
    }
}
