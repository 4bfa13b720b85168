//! Resource model shared by the server, the cache and `rbacctl`.

pub mod api;
pub mod config;
pub mod meta;
pub mod rbac;
pub mod validate;
