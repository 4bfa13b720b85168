//! Network-related constants.

/// Default port for the RBAC control API server.
pub const DEFAULT_API_PORT: u16 = 8080;

/// Default control API address used by `rbacctl`.
pub const DEFAULT_API_ADDR: &str = "http://127.0.0.1:8080";

/// Path prefix every control API route is nested under.
pub const API_PREFIX: &str = "/rbac/v1";

/// Request timeout for `rbacctl`, in seconds.
pub const CLIENT_TIMEOUT_SECS: u64 = 10;
