//! # Update
//!
//! Applies declaration changes to an existing mount.
//!
//! Mutable attributes are tuned in place on the current path first, then a
//! path change is applied as a remount that carries the stored data along.
//! Tuning first means a failed remount leaves a mount with the new config at
//! the old path, which `RemountFailed::config_applied` reports.

use crate::controller::reconciler::diff::ttl_changed;
use crate::controller::reconciler::validation::{duration_to_seconds, same_mount_path};
use crate::controller::reconciler::{finish_span, MountError, Operation, Reconciler};
use crate::mount::{Drift, DriftField, MountSpec, MountState};
use crate::provider::MountConfigInput;
use std::time::Instant;
use tracing::{debug, field, info, info_span, warn, Instrument};

/// Remote changes needed to move a mount from `previous` to a new declaration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdatePlan {
    /// Tune payload, always carrying the full declared config
    pub tune: Option<MountConfigInput>,
    /// `(from, to)` when the path changed
    pub remount: Option<(String, String)>,
    /// Immutable attribute that changed; the mount must be replaced instead
    pub replacement: Option<Drift>,
}

impl UpdatePlan {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.tune.is_none() && self.remount.is_none() && self.replacement.is_none()
    }

    #[must_use]
    pub fn requires_replacement(&self) -> bool {
        self.replacement.is_some()
    }
}

/// Work out which remote calls turn `previous` into `declared`
#[must_use]
pub fn plan_update(previous: &MountState, declared: &MountSpec) -> UpdatePlan {
    if !declared.engine_type.matches_remote(&previous.engine_type) {
        return UpdatePlan {
            replacement: Some(Drift {
                field: DriftField::EngineType,
                declared: declared.engine_type.to_string(),
                observed: previous.engine_type.clone(),
            }),
            ..UpdatePlan::default()
        };
    }

    let config_changed = previous.description != declared.description
        || ttl_changed(
            declared.default_lease_ttl,
            previous.default_lease_ttl,
            previous.inherits_default_lease_ttl,
        )
        || ttl_changed(
            declared.max_lease_ttl,
            previous.max_lease_ttl,
            previous.inherits_max_lease_ttl,
        );

    let tune = config_changed.then(|| MountConfigInput {
        description: Some(declared.description.clone()),
        default_lease_ttl: duration_to_seconds(declared.default_lease_ttl),
        max_lease_ttl: duration_to_seconds(declared.max_lease_ttl),
    });

    let remount = (!same_mount_path(&previous.path, &declared.path))
        .then(|| (previous.path.clone(), declared.path.clone()));

    UpdatePlan {
        tune,
        remount,
        replacement: None,
    }
}

impl Reconciler {
    /// Bring the mount tracked as `previous` in line with `declared`
    ///
    /// # Errors
    /// - `ReplacementRequired` for an engine type change, before any remote call
    /// - `RemountFailed` when the move fails; `config_applied` tells whether
    ///   the tune already went through on the old path
    /// - classified remote errors for the tune
    /// - `Unconfirmed`, carrying the final path, when the changes went through
    ///   but the mount could not be read back
    pub async fn update(
        &self,
        previous: &MountState,
        declared: &MountSpec,
    ) -> Result<MountState, MountError> {
        declared.validate(Operation::Update)?;

        let plan = plan_update(previous, declared);
        if let Some(drift) = &plan.replacement {
            return Err(MountError::ReplacementRequired {
                path: previous.path.clone(),
                field: drift.field,
                from: drift.observed.clone(),
                to: drift.declared.clone(),
            });
        }
        if plan.is_noop() {
            debug!("Mount {} already matches its declaration", previous.path);
            return Ok(previous.clone());
        }

        let span = info_span!(
            "vault.mount.update",
            mount.path = %previous.path,
            mount.new_path = field::Empty,
            operation.success = field::Empty,
            operation.duration_ms = field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();

        async move {
            let mut config_applied = false;
            if let Some(tune) = &plan.tune {
                if let Err(e) = self.backend.update_mount_config(&previous.path, tune).await {
                    finish_span(&span_clone, start, false);
                    return Err(MountError::from_backend(
                        e,
                        &previous.path,
                        Operation::Update,
                    ));
                }
                config_applied = true;
                info!("Tuned mount {}", previous.path);
            }

            let mut path = previous.path.clone();
            if let Some((from, to)) = plan.remount {
                span_clone.record("mount.new_path", to.as_str());
                if let Err(source) = self.backend.move_mount(&from, &to).await {
                    warn!("Remount of {} to {} failed: {}", from, to, source);
                    finish_span(&span_clone, start, false);
                    return Err(MountError::RemountFailed {
                        from,
                        to,
                        config_applied,
                        source,
                    });
                }
                info!("Remounted {} to {}", from, to);
                path = to;
            }

            // The tune or the move already happened; the record now needs a refresh
            let state = match self.read_back(&path).await {
                Ok(state) => state,
                Err(source) => {
                    warn!("Updated mount {} but could not read it back: {}", path, source);
                    finish_span(&span_clone, start, false);
                    return Err(MountError::Unconfirmed {
                        path,
                        operation: Operation::Update,
                        source,
                    });
                }
            };

            finish_span(&span_clone, start, true);
            Ok(state)
        }
        .instrument(span)
        .await
    }
}
