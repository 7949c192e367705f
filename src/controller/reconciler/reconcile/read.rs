//! # Read
//!
//! Refreshes tracked state from Vault and classifies it against the declaration.

use super::{find_mount, observed_state};
use crate::controller::reconciler::validation::normalize_mount_path;
use crate::controller::reconciler::{diff, finish_span, MountError, Operation, Reconciler};
use crate::mount::{MountSpec, ReadOutcome, ReconciliationResult};
use std::time::Instant;
use tracing::{debug, field, info, info_span, warn, Instrument};

impl Reconciler {
    /// Observe the mount tracked under `id` and compare it with `declared`
    ///
    /// A mount deleted out of band yields `Missing` with no state; the
    /// orchestrator is expected to drop its record and plan a Create.
    ///
    /// # Errors
    /// `PermissionDenied`, `RemoteUnavailable` or `Remote` when Vault cannot be
    /// read. The tracked state must then be kept as-is.
    pub async fn read(&self, id: &str, declared: &MountSpec) -> Result<ReadOutcome, MountError> {
        let path = normalize_mount_path(id).to_string();
        if path.is_empty() {
            return Err(MountError::InvalidPath {
                path,
                operation: Operation::Read,
                reason: "mount id cannot be empty".to_string(),
            });
        }

        let span = info_span!(
            "vault.mount.read",
            mount.path = %path,
            mount.result = field::Empty,
            operation.success = field::Empty,
            operation.duration_ms = field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();

        async move {
            let mounts = match self.backend.list_mounts().await {
                Ok(mounts) => mounts,
                Err(e) => {
                    finish_span(&span_clone, start, false);
                    return Err(MountError::from_backend(e, &path, Operation::Read));
                }
            };

            let Some(info) = find_mount(&mounts, &path) else {
                warn!("Mount {} no longer exists in Vault", path);
                span_clone.record("mount.result", "missing");
                finish_span(&span_clone, start, true);
                return Ok(missing());
            };

            let ttls = match self.backend.get_mount_config(&path).await {
                Ok(ttls) => ttls,
                // Unmounted between the listing and the tune lookup
                Err(e) if e.is_not_found() => {
                    warn!("Mount {} disappeared while being read", path);
                    span_clone.record("mount.result", "missing");
                    finish_span(&span_clone, start, true);
                    return Ok(missing());
                }
                Err(e) => {
                    finish_span(&span_clone, start, false);
                    return Err(MountError::from_backend(e, &path, Operation::Read));
                }
            };

            let state = observed_state(&path, info, ttls);
            let result = diff::compare(declared, &state);
            match &result {
                ReconciliationResult::Drifted(drifts) => {
                    for drift in drifts {
                        info!("Mount {} drifted: {}", path, drift);
                    }
                    span_clone.record("mount.result", "drifted");
                }
                _ => {
                    debug!("Mount {} is in sync", path);
                    span_clone.record("mount.result", "in_sync");
                }
            }

            finish_span(&span_clone, start, true);
            Ok(ReadOutcome {
                result,
                state: Some(state),
            })
        }
        .instrument(span)
        .await
    }
}

fn missing() -> ReadOutcome {
    ReadOutcome {
        result: ReconciliationResult::Missing,
        state: None,
    }
}
