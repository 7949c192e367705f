//! # Provider Modules
//!
//! The remote API boundary of the reconciler.
//!
//! A backend exposes Vault's mount table operations. Every TTL crossing this
//! boundary is integer seconds; conversion to durations belongs to the
//! reconciler.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

pub mod vault;

/// Mount as reported by the remote mount listing
///
/// `default_lease_ttl`/`max_lease_ttl` are the configured values, `0` when the
/// mount inherits the server default.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MountInfo {
    pub engine_type: String,
    pub description: String,
    pub accessor: Option<String>,
    pub default_lease_ttl: u64,
    pub max_lease_ttl: u64,
}

/// Payload for creating a mount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInput {
    pub engine_type: String,
    pub description: String,
    /// 0 = server default
    pub default_lease_ttl: u64,
    /// 0 = server default
    pub max_lease_ttl: u64,
}

/// Payload for tuning an existing mount
///
/// A TTL of 0 resets the mount to the server default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountConfigInput {
    pub description: Option<String>,
    pub default_lease_ttl: u64,
    pub max_lease_ttl: u64,
}

/// Effective lease TTLs of a mount, server defaults already applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MountTtls {
    pub default_lease_ttl: u64,
    pub max_lease_ttl: u64,
}

/// Classified failure of a remote call
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// Transport failure, throttling or a server-side error
    #[error("remote unavailable: {message}")]
    Unavailable { message: String },

    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to decode response: {message}")]
    Decode { message: String },
}

impl BackendError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound { .. })
    }
}

/// Remote mount table operations
#[async_trait]
pub trait MountBackend: Send + Sync {
    /// List all mounts keyed by the identifier the remote reports (`secret/`)
    async fn list_mounts(&self) -> Result<HashMap<String, MountInfo>, BackendError>;

    /// Mount a new secret engine at `path`
    async fn create_mount(&self, path: &str, input: &MountInput) -> Result<(), BackendError>;

    /// Change description and TTLs of the mount at `path`
    async fn update_mount_config(
        &self,
        path: &str,
        config: &MountConfigInput,
    ) -> Result<(), BackendError>;

    /// Move a mount and everything stored beneath it to a new path
    async fn move_mount(&self, from: &str, to: &str) -> Result<(), BackendError>;

    /// Unmount `path`, discarding its data
    async fn unmount(&self, path: &str) -> Result<(), BackendError>;

    /// Effective TTLs of the mount at `path`
    async fn get_mount_config(&self, path: &str) -> Result<MountTtls, BackendError>;
}
