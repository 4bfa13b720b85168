use anyhow::Context;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use pkg_constants::network::{API_PREFIX, CLIENT_TIMEOUT_SECS};
use pkg_manifest::{Manifest, ParsedManifest};
use pkg_types::api::{ApiResponse, AuthRequest, AuthResponse};
use pkg_types::rbac::{Role, RoleBinding};

/// How the server answered a create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    BadRequest,
    Conflict,
    NotFound,
    ServerError,
    Unexpected(u16),
}

impl From<StatusCode> for Outcome {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::OK | StatusCode::CREATED => Outcome::Created,
            StatusCode::BAD_REQUEST => Outcome::BadRequest,
            StatusCode::CONFLICT => Outcome::Conflict,
            StatusCode::NOT_FOUND => Outcome::NotFound,
            s if s.is_server_error() => Outcome::ServerError,
            s => Outcome::Unexpected(s.as_u16()),
        }
    }
}

/// Collection path for a manifest's kind.
fn endpoint(manifest: &Manifest) -> &'static str {
    match manifest {
        Manifest::Role(_) => "/role",
        Manifest::RoleBinding(_) => "/rolebinding",
    }
}

/// Human-readable reason taken from an error envelope, falling back to the status.
fn reason<T>(status: StatusCode, body: Option<ApiResponse<T>>) -> String {
    match body {
        Some(resp) => match (resp.message, resp.error) {
            (Some(message), Some(error)) => format!("{}: {}", message, error),
            (Some(message), None) => message,
            (None, Some(error)) => error,
            (None, None) => format!("server returned {}", status),
        },
        None => format!("server returned {}", status),
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(server: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(CLIENT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base: format!("{}{}", server.trim_end_matches('/'), API_PREFIX),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// GET request for a collection; the namespace is sent form-encoded.
    fn list_request(&self, path: &str, namespace: Option<&str>) -> reqwest::RequestBuilder {
        let req = self.http.get(self.url(path));
        match namespace {
            Some(ns) => req.query(&[("namespace", ns)]),
            None => req,
        }
    }

    /// POST a parsed manifest. Transport failures are errors; any HTTP answer is
    /// returned as an `Outcome` with the server's reason.
    pub async fn submit(&self, parsed: &ParsedManifest) -> anyhow::Result<(Outcome, String)> {
        let url = self.url(endpoint(&parsed.manifest));
        debug!("POST {}", url);
        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(parsed.json.clone())
            .send()
            .await
            .with_context(|| format!("sending {} to {}", parsed.display_name, url))?;

        let status = resp.status();
        let outcome = Outcome::from(status);
        if outcome == Outcome::Created {
            return Ok((outcome, String::new()));
        }
        let body = resp.json::<ApiResponse<serde_json::Value>>().await.ok();
        Ok((outcome, reason(status, body)))
    }

    pub async fn list_roles(&self, namespace: Option<&str>) -> anyhow::Result<Vec<Role>> {
        self.get_list("/role", namespace).await
    }

    pub async fn list_role_bindings(
        &self,
        namespace: Option<&str>,
    ) -> anyhow::Result<Vec<RoleBinding>> {
        self.get_list("/rolebinding", namespace).await
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        namespace: Option<&str>,
    ) -> anyhow::Result<Vec<T>> {
        let url = self.url(path);
        debug!("GET {} namespace={:?}", url, namespace);
        let resp = self
            .list_request(path, namespace)
            .send()
            .await
            .with_context(|| format!("querying {}", url))?;
        let status = resp.status();
        let body: ApiResponse<Vec<T>> = resp
            .json()
            .await
            .with_context(|| format!("decoding response from {}", url))?;
        if !status.is_success() || !body.success {
            anyhow::bail!(reason(status, Some(body)));
        }
        Ok(body.data.unwrap_or_default())
    }

    pub async fn can_i(&self, req: &AuthRequest) -> anyhow::Result<bool> {
        let url = self.url("/auth/check");
        debug!("POST {}", url);
        let resp = self
            .http
            .post(&url)
            .json(req)
            .send()
            .await
            .with_context(|| format!("querying {}", url))?;
        let status = resp.status();
        let body: ApiResponse<AuthResponse> = resp
            .json()
            .await
            .with_context(|| format!("decoding response from {}", url))?;
        if !status.is_success() {
            anyhow::bail!(reason(status, Some(body)));
        }
        body.data
            .map(|d| d.authorized)
            .ok_or_else(|| anyhow::anyhow!("server response carried no decision"))
    }
}
