//! # Reconciliation Operations
//!
//! One module per orchestrator entry point.

mod create;
mod delete;
mod read;
mod update;

pub use update::{plan_update, UpdatePlan};

use crate::controller::reconciler::validation::{normalize_mount_path, seconds_to_duration};
use crate::controller::reconciler::Reconciler;
use crate::mount::MountState;
use crate::provider::{BackendError, MountInfo, MountTtls};
use std::collections::HashMap;

/// Find a listed mount by declared path, ignoring Vault's trailing slash
fn find_mount<'a>(mounts: &'a HashMap<String, MountInfo>, path: &str) -> Option<&'a MountInfo> {
    let wanted = normalize_mount_path(path);
    mounts
        .iter()
        .find(|(listed, _)| normalize_mount_path(listed) == wanted)
        .map(|(_, info)| info)
}

/// Build observed state from a listing entry and the effective TTLs
fn observed_state(path: &str, info: &MountInfo, ttls: MountTtls) -> MountState {
    let path = normalize_mount_path(path).to_string();
    MountState {
        id: path.clone(),
        path,
        engine_type: info.engine_type.clone(),
        description: info.description.clone(),
        accessor: info.accessor.clone(),
        default_lease_ttl: seconds_to_duration(ttls.default_lease_ttl),
        max_lease_ttl: seconds_to_duration(ttls.max_lease_ttl),
        inherits_default_lease_ttl: info.default_lease_ttl == 0,
        inherits_max_lease_ttl: info.max_lease_ttl == 0,
    }
}

impl Reconciler {
    /// Read a mount back after a change: listing entry plus effective TTLs
    async fn read_back(&self, path: &str) -> Result<MountState, BackendError> {
        let mounts = self.backend.list_mounts().await?;
        let info = find_mount(&mounts, path).ok_or_else(|| BackendError::NotFound {
            message: format!("mount {path}/ missing from the mount table"),
        })?;
        let ttls = self.backend.get_mount_config(path).await?;
        Ok(observed_state(path, info, ttls))
    }
}
