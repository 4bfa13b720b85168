use pkg_types::meta::ObjectKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RbacError {
    #[error("{kind} {key} already exists")]
    Conflict { kind: &'static str, key: ObjectKey },
    #[error("Role {key} not found")]
    RoleNotFound { key: ObjectKey },
    #[error("failed to persist {key}: {source}")]
    Persistence {
        key: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("malformed record at {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to load {prefix}: {source}")]
    Load {
        prefix: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type RbacResult<T> = Result<T, RbacError>;
