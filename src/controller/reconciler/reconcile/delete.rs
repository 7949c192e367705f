//! # Delete
//!
//! Unmounts a tracked mount. Deleting an already absent mount succeeds.

use crate::controller::reconciler::validation::normalize_mount_path;
use crate::controller::reconciler::{finish_span, MountError, Operation, Reconciler};
use std::time::Instant;
use tracing::{field, info, info_span, Instrument};

use super::find_mount;

impl Reconciler {
    /// Remove the mount tracked under `id` together with all data stored in it
    ///
    /// # Errors
    /// `DeleteFailed` for any failure other than the mount already being gone.
    pub async fn delete(&self, id: &str) -> Result<(), MountError> {
        let path = tracked_path(id, Operation::Delete)?;

        let span = info_span!(
            "vault.mount.delete",
            mount.path = %path,
            operation.success = field::Empty,
            operation.duration_ms = field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();

        async move {
            match self.backend.unmount(&path).await {
                Ok(()) => {
                    info!("Unmounted {}", path);
                }
                Err(e) if e.is_not_found() => {
                    info!("Mount {} already absent", path);
                }
                Err(source) => {
                    finish_span(&span_clone, start, false);
                    return Err(MountError::DeleteFailed { path, source });
                }
            }
            finish_span(&span_clone, start, true);
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Whether a mount exists under `id`; used to verify a Delete took effect
    ///
    /// # Errors
    /// Classified remote errors from listing mounts.
    pub async fn exists(&self, id: &str) -> Result<bool, MountError> {
        let path = tracked_path(id, Operation::Read)?;
        let mounts = self
            .backend
            .list_mounts()
            .await
            .map_err(|e| MountError::from_backend(e, &path, Operation::Read))?;
        Ok(find_mount(&mounts, &path).is_some())
    }
}

fn tracked_path(id: &str, operation: Operation) -> Result<String, MountError> {
    let path = normalize_mount_path(id);
    if path.is_empty() {
        return Err(MountError::InvalidPath {
            path: id.to_string(),
            operation,
            reason: "mount id cannot be empty".to_string(),
        });
    }
    Ok(path.to_string())
}

#[cfg(test)]
mod tests {
    use crate::controller::reconciler::testing::ScriptedBackend;
    use crate::controller::reconciler::{MountError, Reconciler};
    use crate::provider::{BackendError, MountInfo};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_delete_removes_mount() {
        let backend = Arc::new(ScriptedBackend::new().with_mount("kv", MountInfo::default()));
        let reconciler = Reconciler::new(backend.clone());

        reconciler.delete("kv").await.unwrap();
        assert!(!reconciler.exists("kv").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let backend = Arc::new(ScriptedBackend::new().with_mount("kv", MountInfo::default()));
        let reconciler = Reconciler::new(backend);

        reconciler.delete("kv").await.unwrap();
        reconciler.delete("kv").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_source() {
        let backend = Arc::new(ScriptedBackend::new().with_mount("kv", MountInfo::default()));
        backend.fail_next(
            "unmount",
            BackendError::PermissionDenied {
                message: "permission denied".to_string(),
            },
        );
        let reconciler = Reconciler::new(backend.clone());

        let err = reconciler.delete("kv").await.unwrap_err();
        assert!(matches!(
            err,
            MountError::DeleteFailed {
                source: BackendError::PermissionDenied { .. },
                ..
            }
        ));
        assert!(reconciler.exists("kv/").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_rejects_empty_id() {
        let reconciler = Reconciler::new(Arc::new(ScriptedBackend::new()));
        assert!(matches!(
            reconciler.delete(" / ").await,
            Err(MountError::InvalidPath { .. })
        ));
    }
}
