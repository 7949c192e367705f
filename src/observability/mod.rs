//! # Observability
//!
//! Structured logging setup.
//!
//! Every reconciler operation runs inside a `vault.mount.<op>` span that records
//! `operation.success` and `operation.duration_ms`, so the JSON format carries
//! the outcome and timing of each step.

use crate::config::ControllerConfig;
use tracing_subscriber::EnvFilter;

/// Filter directive applied when `RUST_LOG` is not set
#[must_use]
pub fn default_filter(log_level: &str) -> String {
    let level = match log_level.trim().to_lowercase().as_str() {
        level @ ("error" | "warn" | "info" | "debug" | "trace") => level.to_string(),
        _ => "info".to_string(),
    };
    format!("vault_mount_controller={level},mountctl={level}")
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `LOG_LEVEL`. Logs go to stderr so command
/// output on stdout stays machine readable.
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init_logging(config: &ControllerConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config.log_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if config.json_logs() {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.with_target(false).try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}
