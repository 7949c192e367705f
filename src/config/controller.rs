//! # Controller Configuration
//!
//! `mountctl` settings loaded from environment variables.

use super::{env_var_or_default, env_var_or_default_str};
use crate::constants::{
    DEFAULT_MOUNT_STATE_FILE, DEFAULT_RETRY_BACKOFF_MAX_SECS, DEFAULT_RETRY_BACKOFF_MIN_SECS,
    DEFAULT_RETRY_MAX_ATTEMPTS,
};
use std::path::PathBuf;

/// Controller-level configuration
///
/// All settings have defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
    /// Attempts per operation when Vault is unavailable, first try included
    pub retry_max_attempts: u32,
    /// Fibonacci backoff starting value (seconds)
    pub retry_backoff_min_secs: u64,
    /// Fibonacci backoff maximum value (seconds)
    pub retry_backoff_max_secs: u64,
    /// Where tracked mount state is persisted
    pub state_file: PathBuf,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            log_format: "text".to_string(),
            retry_max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            retry_backoff_min_secs: DEFAULT_RETRY_BACKOFF_MIN_SECS,
            retry_backoff_max_secs: DEFAULT_RETRY_BACKOFF_MAX_SECS,
            state_file: PathBuf::from(DEFAULT_MOUNT_STATE_FILE),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            log_level: env_var_or_default_str("LOG_LEVEL", "INFO"),
            log_format: env_var_or_default_str("LOG_FORMAT", "text"),
            retry_max_attempts: env_var_or_default(
                "RETRY_MAX_ATTEMPTS",
                DEFAULT_RETRY_MAX_ATTEMPTS,
            )
            .max(1),
            retry_backoff_min_secs: env_var_or_default(
                "RETRY_BACKOFF_MIN_SECS",
                DEFAULT_RETRY_BACKOFF_MIN_SECS,
            ),
            retry_backoff_max_secs: env_var_or_default(
                "RETRY_BACKOFF_MAX_SECS",
                DEFAULT_RETRY_BACKOFF_MAX_SECS,
            ),
            state_file: PathBuf::from(env_var_or_default_str(
                "MOUNT_STATE_FILE",
                DEFAULT_MOUNT_STATE_FILE,
            )),
        }
    }

    /// Whether logs should be emitted as JSON lines
    #[must_use]
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}
