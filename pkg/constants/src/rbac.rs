//! Resource model constants.

/// Canonical `apiVersion` for Role and RoleBinding.
pub const API_VERSION: &str = "rbac/v1";

/// `kind` tag of a Role manifest.
pub const KIND_ROLE: &str = "Role";

/// `kind` tag of a RoleBinding manifest.
pub const KIND_ROLE_BINDING: &str = "RoleBinding";

/// Namespace used when a manifest leaves it empty.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Matches any verb or resource inside a policy rule.
pub const WILDCARD: &str = "*";
