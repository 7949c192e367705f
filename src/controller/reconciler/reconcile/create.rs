//! # Create
//!
//! Mounts a declared engine and records the effective TTLs Vault applied.

use crate::controller::reconciler::validation::duration_to_seconds;
use crate::controller::reconciler::{finish_span, MountError, Operation, Reconciler};
use crate::mount::{MountSpec, MountState};
use crate::provider::MountInput;
use std::time::Instant;
use tracing::{debug, field, info, info_span, warn, Instrument};

impl Reconciler {
    /// Provision a new mount for `spec`
    ///
    /// Zero TTLs leave the choice to Vault; the returned state carries the
    /// default Vault injected and the accessor it assigned, so a following
    /// Read sees no drift.
    ///
    /// # Errors
    /// `AlreadyMounted` when the path collides, `PermissionDenied` when Vault
    /// refuses, `InvalidPath`/`ConfigParse` before any remote call.
    /// `Unconfirmed` when the mount was created but could not be read back.
    pub async fn create(&self, spec: &MountSpec) -> Result<MountState, MountError> {
        spec.validate(Operation::Create)?;

        let span = info_span!(
            "vault.mount.create",
            mount.path = %spec.path,
            mount.engine = %spec.engine_type,
            operation.success = field::Empty,
            operation.duration_ms = field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();

        async move {
            let input = MountInput {
                engine_type: spec.engine_type.as_str().to_string(),
                description: spec.description.clone(),
                default_lease_ttl: duration_to_seconds(spec.default_lease_ttl),
                max_lease_ttl: duration_to_seconds(spec.max_lease_ttl),
            };

            if let Err(e) = self.backend.create_mount(&spec.path, &input).await {
                finish_span(&span_clone, start, false);
                return Err(MountError::from_backend(e, &spec.path, Operation::Create));
            }
            info!("Mounted {} engine at {}", spec.engine_type, spec.path);

            // From here on the mount exists; failures must not lead to a blind retry
            let state = match self.read_back(&spec.path).await {
                Ok(state) => state,
                Err(source) => {
                    warn!("Mounted {} but could not read it back: {}", spec.path, source);
                    finish_span(&span_clone, start, false);
                    return Err(MountError::Unconfirmed {
                        path: spec.path.clone(),
                        operation: Operation::Create,
                        source,
                    });
                }
            };
            debug!(
                "Mount {} effective TTLs: default={}s max={}s",
                spec.path,
                state.default_lease_ttl.as_secs(),
                state.max_lease_ttl.as_secs()
            );

            finish_span(&span_clone, start, true);
            Ok(state)
        }
        .instrument(span)
        .await
    }
}
