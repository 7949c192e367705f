//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Default Vault address when `VAULT_ADDR` is not set
pub const DEFAULT_VAULT_ADDR: &str = "http://127.0.0.1:8200";

/// Default timeout for a single Vault HTTP request (seconds)
pub const DEFAULT_VAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Delay between remount migration status polls (milliseconds)
pub const DEFAULT_REMOUNT_POLL_INTERVAL_MS: u64 = 500;

/// Number of remount migration status polls before giving up
pub const DEFAULT_REMOUNT_POLL_ATTEMPTS: u32 = 20;

/// Maximum attempts for an orchestrator operation that fails with a transient error
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 5;

/// Fibonacci backoff starting value (seconds)
pub const DEFAULT_RETRY_BACKOFF_MIN_SECS: u64 = 1;

/// Fibonacci backoff maximum value (seconds)
pub const DEFAULT_RETRY_BACKOFF_MAX_SECS: u64 = 30;

/// Default location of the tracked resource record
pub const DEFAULT_MOUNT_STATE_FILE: &str = "mount.state.json";

/// Description applied when a declaration leaves it out
pub const DEFAULT_MOUNT_DESCRIPTION: &str = "Managed by vault-mount-controller";

/// Mount paths owned by Vault itself
pub const RESERVED_MOUNT_PATHS: &[&str] = &["sys", "cubbyhole", "identity", "auth"];

/// Maximum accepted length of a mount path
pub const MAX_MOUNT_PATH_LEN: usize = 1024;
