//! Scripted in-memory `MountBackend` for reconciler unit tests.

use crate::provider::{
    BackendError, MountBackend, MountConfigInput, MountInfo, MountInput, MountTtls,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub const SERVER_DEFAULT_TTL: u64 = 2_764_800;

#[derive(Debug, Default)]
pub struct ScriptedBackend {
    /// Keyed the way Vault reports them, with a trailing slash
    pub mounts: Mutex<HashMap<String, MountInfo>>,
    pub calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, BackendError>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mount(self, path: &str, info: MountInfo) -> Self {
        self.mounts
            .lock()
            .unwrap()
            .insert(format!("{path}/"), info);
        self
    }

    /// Make the next call of `operation` fail with `error`
    pub fn fail_next(&self, operation: &'static str, error: BackendError) {
        self.failures.lock().unwrap().insert(operation, error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mount(&self, path: &str) -> Option<MountInfo> {
        self.mounts.lock().unwrap().get(&format!("{path}/")).cloned()
    }

    fn record(&self, operation: &'static str, detail: &str) -> Result<(), BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{operation} {detail}"));
        match self.failures.lock().unwrap().remove(operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn not_found(path: &str) -> BackendError {
        BackendError::NotFound {
            message: format!("no mount at {path}/"),
        }
    }
}

#[async_trait]
impl MountBackend for ScriptedBackend {
    async fn list_mounts(&self) -> Result<HashMap<String, MountInfo>, BackendError> {
        self.record("list_mounts", "")?;
        Ok(self.mounts.lock().unwrap().clone())
    }

    async fn create_mount(&self, path: &str, input: &MountInput) -> Result<(), BackendError> {
        self.record("create_mount", path)?;
        let mut mounts = self.mounts.lock().unwrap();
        let key = format!("{path}/");
        if mounts.contains_key(&key) {
            return Err(BackendError::Conflict {
                message: format!("path is already in use at {key}"),
            });
        }
        mounts.insert(
            key,
            MountInfo {
                engine_type: input.engine_type.clone(),
                description: input.description.clone(),
                accessor: Some(format!("{}_0000", input.engine_type)),
                default_lease_ttl: input.default_lease_ttl,
                max_lease_ttl: input.max_lease_ttl,
            },
        );
        Ok(())
    }

    async fn update_mount_config(
        &self,
        path: &str,
        config: &MountConfigInput,
    ) -> Result<(), BackendError> {
        self.record("update_mount_config", path)?;
        let mut mounts = self.mounts.lock().unwrap();
        let info = mounts
            .get_mut(&format!("{path}/"))
            .ok_or_else(|| Self::not_found(path))?;
        if let Some(description) = &config.description {
            info.description.clone_from(description);
        }
        info.default_lease_ttl = config.default_lease_ttl;
        info.max_lease_ttl = config.max_lease_ttl;
        Ok(())
    }

    async fn move_mount(&self, from: &str, to: &str) -> Result<(), BackendError> {
        self.record("move_mount", &format!("{from} -> {to}"))?;
        let mut mounts = self.mounts.lock().unwrap();
        let info = mounts
            .remove(&format!("{from}/"))
            .ok_or_else(|| Self::not_found(from))?;
        mounts.insert(format!("{to}/"), info);
        Ok(())
    }

    async fn unmount(&self, path: &str) -> Result<(), BackendError> {
        self.record("unmount", path)?;
        self.mounts
            .lock()
            .unwrap()
            .remove(&format!("{path}/"))
            .map(|_| ())
            .ok_or_else(|| Self::not_found(path))
    }

    async fn get_mount_config(&self, path: &str) -> Result<MountTtls, BackendError> {
        self.record("get_mount_config", path)?;
        let mounts = self.mounts.lock().unwrap();
        let info = mounts
            .get(&format!("{path}/"))
            .ok_or_else(|| Self::not_found(path))?;
        let effective = |ttl: u64| if ttl == 0 { SERVER_DEFAULT_TTL } else { ttl };
        Ok(MountTtls {
            default_lease_ttl: effective(info.default_lease_ttl),
            max_lease_ttl: effective(info.max_lease_ttl),
        })
    }
}
