//! Durable key-value storage for RBAC resources.
//!
//! [`store::KvStore`] is the seam the authorization cache persists through;
//! [`client::StateStore`] is the SlateDB-backed implementation.

pub mod client;
pub mod store;
