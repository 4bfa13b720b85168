//! Declarative manifests: YAML in, typed resources and JSON out.
//!
//! Only the `apiVersion`/`kind` header is read first; the `kind` then selects
//! the concrete resource type the whole document is decoded into.

mod error;
mod parser;

pub use error::ManifestError;
pub use parser::{Kind, Manifest, ParsedManifest, parse, parse_documents};
