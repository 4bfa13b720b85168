//! Centralized constants for the RBAC control plane.
//!
//! All project-wide constant values live here.
//! Change a value in one place and it applies everywhere.

pub mod network;
pub mod paths;
pub mod rbac;
pub mod state;
