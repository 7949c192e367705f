//! Context wired to a Vault mock server and a throwaway state file

use crate::state::StateFile;
use crate::Context;
use std::sync::Arc;
use tempfile::TempDir;
use vault_mock_server::{spawn_ephemeral, MockConfig, MockVault};
use vault_mount_controller::config::VaultConfig;
use vault_mount_controller::controller::backoff::RetryPolicy;
use vault_mount_controller::controller::reconciler::Reconciler;
use vault_mount_controller::provider::vault::VaultClient;

/// Keeps the mock and the state directory alive for the duration of a test
pub(crate) struct Harness {
    pub mock: MockVault,
    pub ctx: Context,
    _dir: TempDir,
}

pub(crate) async fn harness() -> Harness {
    let mock = spawn_ephemeral(MockConfig::with_token("root"))
        .await
        .expect("Failed to start Vault mock server");
    let mut config = VaultConfig::for_address(&mock.url(), Some("root"));
    config.remount_poll_interval_ms = 10;
    let client = VaultClient::new(&config).expect("Failed to create Vault client");

    let dir = tempfile::tempdir().expect("Failed to create state directory");
    let ctx = Context {
        reconciler: Reconciler::new(Arc::new(client)),
        retry: RetryPolicy {
            max_attempts: 3,
            backoff_min_secs: 0,
            backoff_max_secs: 0,
        },
        state: StateFile::new(dir.path().join("mount.state.json")),
    };
    Harness {
        mock,
        ctx,
        _dir: dir,
    }
}
