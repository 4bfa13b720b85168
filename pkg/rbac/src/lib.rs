//! Authorization cache and decision engine.
//!
//! [`RbacSystem`] mirrors the Roles and RoleBindings held in the durable
//! store. Writes persist first and only then touch memory, so the cache never
//! holds an entry the store does not. Authorization reads are answered from
//! memory under a shared lock and never reach the network.

pub mod cache;
pub mod engine;
pub mod error;
pub mod seed;

pub use cache::{RbacMaps, RbacSystem};
pub use error::RbacError;
