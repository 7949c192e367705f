//! Shared helpers for integration tests against the Vault mock server

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::{Arc, Once};
use std::time::Duration;
use vault_mock_server::{spawn_ephemeral, MockConfig, MockVault};
use vault_mount_controller::config::VaultConfig;
use vault_mount_controller::controller::reconciler::Reconciler;
use vault_mount_controller::mount::{EngineType, MountDeclaration, MountSpec};
use vault_mount_controller::provider::vault::VaultClient;
use vault_mount_controller::provider::MountBackend;

pub const TEST_TOKEN: &str = "root";

static TRACING_INIT: Once = Once::new();

/// Route test logs through the test harness; `RUST_LOG` controls verbosity
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Running mock plus a client and reconciler pointed at it
pub struct TestVault {
    pub mock: MockVault,
    pub client: Arc<VaultClient>,
    pub reconciler: Reconciler,
}

pub async fn start_vault() -> TestVault {
    init_tracing();
    let mock = spawn_ephemeral(MockConfig::with_token(TEST_TOKEN))
        .await
        .expect("Failed to start Vault mock server");
    let client = Arc::new(client_for(&mock.url(), Some(TEST_TOKEN)));
    let reconciler = Reconciler::new(Arc::clone(&client) as Arc<dyn MountBackend>);
    TestVault {
        mock,
        client,
        reconciler,
    }
}

pub fn client_for(address: &str, token: Option<&str>) -> VaultClient {
    let mut config = VaultConfig::for_address(address, token);
    config.request_timeout_secs = 5;
    config.remount_poll_interval_ms = 10;
    VaultClient::new(&config).expect("Failed to create Vault client")
}

/// Declaration with TTLs given as duration strings
pub fn declared(path: &str, default_ttl: &str, max_ttl: &str) -> MountSpec {
    MountDeclaration {
        path: Some(path.to_string()),
        engine_type: "generic".to_string(),
        description: Some("hello world".to_string()),
        default_lease_ttl: Some(default_ttl.to_string()),
        max_lease_ttl: Some(max_ttl.to_string()),
    }
    .into_spec()
    .expect("declaration should be valid")
}

/// Generic mount with every optional attribute left out
pub fn minimal(path: &str) -> MountSpec {
    MountSpec::new(path, EngineType::Generic)
}

pub fn secs(seconds: u64) -> Duration {
    Duration::from_secs(seconds)
}
