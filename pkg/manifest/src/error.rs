use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid meta type or meta type not found: {0}")]
    InvalidMeta(String),
    #[error("register kind error: unsupported kind '{0}'")]
    UnknownKind(String),
    #[error("register kind error: {kind} body is malformed: {source}")]
    MalformedBody {
        kind: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("serialized error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("serialized error: {0}")]
    Yaml(#[source] serde_yaml::Error),
}
