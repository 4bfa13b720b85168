//! State store constants.

/// Key prefix under which Roles are persisted: `<prefix><namespace>/<name>`.
pub const ROLE_PREFIX: &str = "/rbac/v1/role/";

/// Key prefix under which RoleBindings are persisted.
pub const ROLE_BINDING_PREFIX: &str = "/rbac/v1/rolebindings/";

/// Key read by the liveness probe. It never needs to exist.
pub const HEALTH_CHECK_KEY: &str = "health-check-key";

/// Upper bound for the liveness probe's store round trip, in seconds.
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 2;
