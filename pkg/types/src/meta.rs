use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use pkg_constants::rbac::{API_VERSION, DEFAULT_NAMESPACE};

// --- TypeMeta ---

/// Identifies which concrete resource a document represents.
/// Inlined at the document root (`apiVersion`, `kind`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

// --- ObjectMeta ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    /// Empty means "default".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Assigned by the server at creation, never by the caller.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    /// Assigned by the server at creation and never changed afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    /// Reserved for a delete path; always absent today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<DateTime<Utc>>,
}

// --- Identity key ---

/// `(namespace, name)` identity of a namespaced resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Store key for this identity under `prefix` (e.g. `/rbac/v1/role/`).
    pub fn storage_key(&self, prefix: &str) -> String {
        format!("{}{}/{}", prefix, self.namespace, self.name)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

// --- Accessor contract ---

/// Shared capability of every resource: access to its TypeMeta and ObjectMeta.
///
/// Registrar and server code work through this trait so defaulting and
/// creation stamping never depend on the concrete resource type.
pub trait Object {
    /// `kind` tag this type is registered under.
    const KIND: &'static str;

    fn type_meta(&self) -> &TypeMeta;
    fn type_meta_mut(&mut self) -> &mut TypeMeta;
    fn metadata(&self) -> &ObjectMeta;
    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    fn api_version(&self) -> &str {
        &self.type_meta().api_version
    }

    fn set_api_version(&mut self, version: &str) {
        self.type_meta_mut().api_version = version.to_string();
    }

    fn kind(&self) -> &str {
        &self.type_meta().kind
    }

    fn name(&self) -> &str {
        &self.metadata().name
    }

    fn namespace(&self) -> &str {
        &self.metadata().namespace
    }

    fn set_namespace(&mut self, namespace: &str) {
        self.metadata_mut().namespace = namespace.to_string();
    }

    fn uid(&self) -> &str {
        &self.metadata().uid
    }

    fn creation_timestamp(&self) -> Option<DateTime<Utc>> {
        self.metadata().creation_timestamp
    }

    fn key(&self) -> ObjectKey {
        ObjectKey::new(self.namespace(), self.name())
    }

    /// Force the canonical `apiVersion` and fill an empty namespace.
    /// `kind` is never defaulted.
    fn apply_defaults(&mut self) {
        self.set_api_version(API_VERSION);
        if self.namespace().is_empty() {
            self.set_namespace(DEFAULT_NAMESPACE);
        }
    }

    /// Assign a fresh `uid` and `creationTimestamp`, discarding anything the
    /// caller supplied. Called exactly once, on the create path.
    fn stamp_creation(&mut self) {
        let meta = self.metadata_mut();
        meta.uid = Uuid::new_v4().to_string();
        meta.creation_timestamp = Some(Utc::now());
        meta.deletion_timestamp = None;
    }
}
