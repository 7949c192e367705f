//! Tracked resource record persisted between `mountctl` runs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vault_mount_controller::mount::MountState;

const STATE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StateRecord {
    version: u32,
    mount: MountState,
}

/// JSON file holding the primary ID and last observed attributes of one mount
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the tracked mount, `None` when nothing is tracked yet
    pub fn load(&self) -> Result<Option<MountState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file {}", self.path.display()))?;
        let record: StateRecord = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file {}", self.path.display()))?;
        if record.version != STATE_FORMAT_VERSION {
            return Err(anyhow::anyhow!(
                "Unsupported state file version {} in {} (expected {})",
                record.version,
                self.path.display(),
                STATE_FORMAT_VERSION
            ));
        }
        Ok(Some(record.mount))
    }

    /// Persist `mount`, replacing the file atomically
    pub fn save(&self, mount: &MountState) -> Result<()> {
        let record = StateRecord {
            version: STATE_FORMAT_VERSION,
            mount: mount.clone(),
        };
        let content =
            serde_json::to_string_pretty(&record).context("Failed to serialize mount state")?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace state file {}", self.path.display()))?;
        Ok(())
    }

    /// Drop the record; a missing file is fine
    pub fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove state file {}", self.path.display())),
        }
    }
}
