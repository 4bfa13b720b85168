use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use pkg_constants::rbac::{KIND_ROLE, KIND_ROLE_BINDING};
use pkg_types::meta::{Object, TypeMeta};
use pkg_types::rbac::{Role, RoleBinding};

use crate::error::ManifestError;

/// Registered resource kinds. Anything else is carried as `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Role,
    RoleBinding,
    Unknown(String),
}

impl From<&str> for Kind {
    fn from(kind: &str) -> Self {
        match kind {
            KIND_ROLE => Kind::Role,
            KIND_ROLE_BINDING => Kind::RoleBinding,
            other => Kind::Unknown(other.to_string()),
        }
    }
}

impl Kind {
    pub fn as_str(&self) -> &str {
        match self {
            Kind::Role => KIND_ROLE,
            Kind::RoleBinding => KIND_ROLE_BINDING,
            Kind::Unknown(kind) => kind.as_str(),
        }
    }
}

/// A decoded, defaulted resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Manifest {
    Role(Role),
    RoleBinding(RoleBinding),
}

impl Manifest {
    pub fn kind(&self) -> Kind {
        match self {
            Manifest::Role(_) => Kind::Role,
            Manifest::RoleBinding(_) => Kind::RoleBinding,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Manifest::Role(r) => r.name(),
            Manifest::RoleBinding(rb) => rb.name(),
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Manifest::Role(r) => r.namespace(),
            Manifest::RoleBinding(rb) => rb.namespace(),
        }
    }

    /// `"<Kind> <name>"`, as printed by `rbacctl`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.kind().as_str(), self.name())
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ManifestError> {
        let data = match self {
            Manifest::Role(r) => serde_json::to_vec(r)?,
            Manifest::RoleBinding(rb) => serde_json::to_vec(rb)?,
        };
        Ok(data)
    }

    pub fn to_yaml(&self) -> Result<String, ManifestError> {
        let rendered = match self {
            Manifest::Role(r) => serde_yaml::to_string(r),
            Manifest::RoleBinding(rb) => serde_yaml::to_string(rb),
        };
        rendered.map_err(ManifestError::Yaml)
    }
}

/// Result of parsing one manifest document.
#[derive(Debug, Clone)]
pub struct ParsedManifest {
    pub display_name: String,
    pub kind: Kind,
    /// Body to submit to the control API.
    pub json: Vec<u8>,
    /// Human-readable rendering, only produced when asked for.
    pub yaml: Option<String>,
    pub manifest: Manifest,
}

/// Parse a single YAML document into a typed, defaulted resource.
pub fn parse(raw: &str, with_yaml: bool) -> Result<ParsedManifest, ManifestError> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(raw).map_err(|e| ManifestError::InvalidMeta(e.to_string()))?;
    parse_value(value, with_yaml)
}

/// Parse a `---` separated YAML stream. Empty documents are skipped; a stream
/// without any resource is an error.
pub fn parse_documents(raw: &str, with_yaml: bool) -> Result<Vec<ParsedManifest>, ManifestError> {
    let mut parsed = Vec::new();
    for document in serde_yaml::Deserializer::from_str(raw) {
        let value = serde_yaml::Value::deserialize(document)
            .map_err(|e| ManifestError::InvalidMeta(e.to_string()))?;
        if value.is_null() {
            continue;
        }
        parsed.push(parse_value(value, with_yaml)?);
    }
    if parsed.is_empty() {
        return Err(ManifestError::InvalidMeta("no resources found".to_string()));
    }
    Ok(parsed)
}

fn parse_value(value: serde_yaml::Value, with_yaml: bool) -> Result<ParsedManifest, ManifestError> {
    if !value.is_mapping() {
        return Err(ManifestError::InvalidMeta(
            "manifest must be a YAML mapping".to_string(),
        ));
    }
    let type_meta: TypeMeta = serde_yaml::from_value(value.clone())
        .map_err(|e| ManifestError::InvalidMeta(e.to_string()))?;
    if type_meta.api_version.is_empty() || type_meta.kind.is_empty() {
        return Err(ManifestError::InvalidMeta(
            "apiVersion and kind are required".to_string(),
        ));
    }

    let manifest = match Kind::from(type_meta.kind.as_str()) {
        Kind::Role => Manifest::Role(decode(value)?),
        Kind::RoleBinding => Manifest::RoleBinding(decode(value)?),
        Kind::Unknown(kind) => return Err(ManifestError::UnknownKind(kind)),
    };
    debug!("Parsed {}", manifest.display_name());

    let json = manifest.to_json()?;
    let yaml = if with_yaml {
        Some(manifest.to_yaml()?)
    } else {
        None
    };

    Ok(ParsedManifest {
        display_name: manifest.display_name(),
        kind: manifest.kind(),
        json,
        yaml,
        manifest,
    })
}

fn decode<T: Object + DeserializeOwned>(value: serde_yaml::Value) -> Result<T, ManifestError> {
    let mut obj: T = serde_yaml::from_value(value)
        .map_err(|source| ManifestError::MalformedBody { kind: T::KIND, source })?;
    obj.apply_defaults();
    Ok(obj)
}
