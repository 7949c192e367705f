//! # Configuration
//!
//! Settings loaded from environment variables, each with a default.
//!
//! - `vault`: how to reach the Vault server
//! - `controller`: logging, retry and state file settings of `mountctl`

mod controller;
mod vault;

pub use controller::ControllerConfig;
pub use vault::VaultConfig;

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read environment variable, treating unset and blank the same
fn env_var_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
