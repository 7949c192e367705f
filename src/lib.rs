//! Vault Mount Controller Library
//!
//! Declarative reconciler for HashiCorp Vault secret-engine mounts. A declared
//! mount (engine type, path, description, lease TTLs) is kept in sync with the
//! live `sys/mounts` table of a Vault server.
//!
//! ## Quick Start
//!
//! ```rust
//! use vault_mount_controller::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod config;
pub mod constants;
pub mod controller;
pub mod mount;
pub mod observability;
pub mod prelude;
pub mod provider;
