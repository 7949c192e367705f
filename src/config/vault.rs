//! # Vault Configuration
//!
//! Connection settings for the Vault HTTP API.

use super::{env_var_non_empty, env_var_or_default, env_var_or_default_str};
use crate::constants::{
    DEFAULT_REMOUNT_POLL_ATTEMPTS, DEFAULT_REMOUNT_POLL_INTERVAL_MS, DEFAULT_VAULT_ADDR,
    DEFAULT_VAULT_REQUEST_TIMEOUT_SECS,
};
use std::time::Duration;

/// Vault connection configuration
#[derive(Clone)]
pub struct VaultConfig {
    /// Base address, without the `/v1` prefix
    pub address: String,
    /// Sent as `X-Vault-Token` when set
    pub token: Option<String>,
    /// Sent as `X-Vault-Namespace` when set (Vault Enterprise)
    pub namespace: Option<String>,
    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Delay between remount migration status checks (milliseconds)
    pub remount_poll_interval_ms: u64,
    /// Status checks before a remount migration counts as failed
    pub remount_poll_attempts: u32,
}

// Keeps the token out of logs
impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("address", &self.address)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("namespace", &self.namespace)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("remount_poll_interval_ms", &self.remount_poll_interval_ms)
            .field("remount_poll_attempts", &self.remount_poll_attempts)
            .finish()
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_VAULT_ADDR.to_string(),
            token: None,
            namespace: None,
            request_timeout_secs: DEFAULT_VAULT_REQUEST_TIMEOUT_SECS,
            remount_poll_interval_ms: DEFAULT_REMOUNT_POLL_INTERVAL_MS,
            remount_poll_attempts: DEFAULT_REMOUNT_POLL_ATTEMPTS,
        }
    }
}

impl VaultConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            address: env_var_or_default_str("VAULT_ADDR", DEFAULT_VAULT_ADDR),
            token: env_var_non_empty("VAULT_TOKEN"),
            namespace: env_var_non_empty("VAULT_NAMESPACE"),
            request_timeout_secs: env_var_or_default(
                "VAULT_REQUEST_TIMEOUT_SECS",
                DEFAULT_VAULT_REQUEST_TIMEOUT_SECS,
            ),
            remount_poll_interval_ms: env_var_or_default(
                "VAULT_REMOUNT_POLL_INTERVAL_MS",
                DEFAULT_REMOUNT_POLL_INTERVAL_MS,
            ),
            remount_poll_attempts: env_var_or_default(
                "VAULT_REMOUNT_POLL_ATTEMPTS",
                DEFAULT_REMOUNT_POLL_ATTEMPTS,
            ),
        }
    }

    /// Configuration for `address` with everything else defaulted
    #[must_use]
    pub fn for_address(address: &str, token: Option<&str>) -> Self {
        Self {
            address: address.to_string(),
            token: token.map(str::to_string),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn remount_poll_interval(&self) -> Duration {
        Duration::from_millis(self.remount_poll_interval_ms)
    }
}
