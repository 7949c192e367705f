//! Pact contract tests for the Vault `sys/mounts` API
//!
//! These tests define the contract between the mount reconciler's Vault
//! client and Vault. Each test drives `VaultClient` itself against a Pact mock
//! server, so request bodies are checked exactly as the client serializes them.

mod common;

use common::{client_for, init_tracing, TEST_TOKEN};
use pact_consumer::prelude::*;
use serde_json::json;
use vault_mount_controller::provider::{
    BackendError, MountBackend, MountConfigInput, MountInput, MountTtls,
};

const CONSUMER: &str = "vault-mount-controller";
const PROVIDER: &str = "Vault";

/// Mock server URL without the trailing slash
fn base_url(url: impl std::fmt::Display) -> String {
    let mut base_url = url.to_string();
    if base_url.ends_with('/') {
        base_url.pop();
    }
    base_url
}

#[tokio::test]
async fn test_enable_mount_with_explicit_ttls_contract() {
    init_tracing();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("enable a generic engine with explicit lease TTLs", "", |mut i| {
        i.given("no mount exists at team/kv");
        i.request
            .method("POST")
            .path("/v1/sys/mounts/team/kv")
            .header("x-vault-token", TEST_TOKEN)
            .json_body(json!({
                "type": "generic",
                "description": "hello world",
                "config": {
                    "default_lease_ttl": 1800,
                    "max_lease_ttl": 6000
                }
            }));
        i.response.status(204);
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&base_url(mock_server.url()), Some(TEST_TOKEN));

    client
        .create_mount(
            "team/kv",
            &MountInput {
                engine_type: "generic".to_string(),
                description: "hello world".to_string(),
                default_lease_ttl: 1800,
                max_lease_ttl: 6000,
            },
        )
        .await
        .expect("enable should succeed");
}

#[tokio::test]
async fn test_enable_mount_with_server_default_ttls_contract() {
    init_tracing();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("enable a generic engine with server default lease TTLs", "", |mut i| {
        i.given("no mount exists at generic");
        i.request
            .method("POST")
            .path("/v1/sys/mounts/generic")
            .header("x-vault-token", TEST_TOKEN)
            .json_body(json!({
                "type": "generic",
                "description": "Managed by vault-mount-controller",
                "config": {}
            }));
        i.response.status(204);
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&base_url(mock_server.url()), Some(TEST_TOKEN));

    client
        .create_mount(
            "generic",
            &MountInput {
                engine_type: "generic".to_string(),
                description: "Managed by vault-mount-controller".to_string(),
                default_lease_ttl: 0,
                max_lease_ttl: 0,
            },
        )
        .await
        .expect("enable should succeed");
}

#[tokio::test]
async fn test_enable_mount_conflict_contract() {
    init_tracing();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("enable an engine on a path already in use", "", |mut i| {
        i.given("a mount exists at team/kv");
        i.request
            .method("POST")
            .path("/v1/sys/mounts/team/kv")
            .header("x-vault-token", TEST_TOKEN);
        i.response
            .status(400)
            .header("content-type", "application/json")
            .json_body(json!({
                "errors": ["path is already in use at team/kv/"]
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&base_url(mock_server.url()), Some(TEST_TOKEN));

    let err = client
        .create_mount(
            "team/kv",
            &MountInput {
                engine_type: "generic".to_string(),
                description: "hello world".to_string(),
                default_lease_ttl: 0,
                max_lease_ttl: 0,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Conflict { .. }), "{err:?}");
}

#[tokio::test]
async fn test_list_mounts_contract() {
    init_tracing();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("list the mount table", "", |mut i| {
        i.given("a generic mount exists at team/kv");
        i.request
            .method("GET")
            .path("/v1/sys/mounts")
            .header("x-vault-token", TEST_TOKEN);
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "request_id": "5f6b1c2e-1d0a-4f51-9d2c-7a0c3c1b2a11",
                "lease_id": "",
                "renewable": false,
                "lease_duration": 0,
                "data": {
                    "sys/": {
                        "type": "system",
                        "description": "system endpoints used for control, policy and debugging",
                        "accessor": "system_7e4f4bd2",
                        "config": { "default_lease_ttl": 0, "max_lease_ttl": 0 }
                    },
                    "team/kv/": {
                        "type": "generic",
                        "description": "hello world",
                        "accessor": "generic_1a2b3c4d",
                        "config": { "default_lease_ttl": 1800, "max_lease_ttl": 0 }
                    }
                },
                "wrap_info": null,
                "warnings": null,
                "auth": null
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&base_url(mock_server.url()), Some(TEST_TOKEN));

    let mounts = client.list_mounts().await.expect("listing should succeed");
    assert_eq!(mounts.len(), 2);
    let kv = &mounts["team/kv/"];
    assert_eq!(kv.engine_type, "generic");
    assert_eq!(kv.description, "hello world");
    assert_eq!(kv.accessor.as_deref(), Some("generic_1a2b3c4d"));
    assert_eq!(kv.default_lease_ttl, 1800);
    assert_eq!(kv.max_lease_ttl, 0);
}

#[tokio::test]
async fn test_read_mount_tune_contract() {
    init_tracing();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("read the effective lease TTLs of a mount", "", |mut i| {
        i.given("a generic mount with a 30m default TTL exists at team/kv");
        i.request
            .method("GET")
            .path("/v1/sys/mounts/team/kv/tune")
            .header("x-vault-token", TEST_TOKEN);
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "default_lease_ttl": 1800,
                "max_lease_ttl": 2_764_800,
                "force_no_cache": false,
                "data": {
                    "default_lease_ttl": 1800,
                    "max_lease_ttl": 2_764_800,
                    "force_no_cache": false
                }
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&base_url(mock_server.url()), Some(TEST_TOKEN));

    let ttls = client
        .get_mount_config("team/kv")
        .await
        .expect("tune read should succeed");
    assert_eq!(
        ttls,
        MountTtls {
            default_lease_ttl: 1800,
            max_lease_ttl: 2_764_800,
        }
    );
}

#[tokio::test]
async fn test_tune_mount_contract() {
    init_tracing();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("tune description and TTLs of a mount", "", |mut i| {
        i.given("a generic mount exists at team/kv");
        i.request
            .method("POST")
            .path("/v1/sys/mounts/team/kv/tune")
            .header("x-vault-token", TEST_TOKEN)
            .json_body(json!({
                "description": "hello world",
                "default_lease_ttl": "system",
                "max_lease_ttl": 12000
            }));
        i.response.status(204);
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&base_url(mock_server.url()), Some(TEST_TOKEN));

    client
        .update_mount_config(
            "team/kv",
            &MountConfigInput {
                description: Some("hello world".to_string()),
                default_lease_ttl: 0,
                max_lease_ttl: 12000,
            },
        )
        .await
        .expect("tune should succeed");
}

#[tokio::test]
async fn test_tune_missing_mount_contract() {
    init_tracing();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("tune a path without a mount", "", |mut i| {
        i.given("no mount exists at team/kv");
        i.request
            .method("GET")
            .path("/v1/sys/mounts/team/kv/tune")
            .header("x-vault-token", TEST_TOKEN);
        i.response
            .status(400)
            .header("content-type", "application/json")
            .json_body(json!({
                "errors": ["cannot fetch sysview for path \"team/kv/\""]
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&base_url(mock_server.url()), Some(TEST_TOKEN));

    let err = client.get_mount_config("team/kv").await.unwrap_err();
    assert!(err.is_not_found(), "{err:?}");
}

#[tokio::test]
async fn test_remount_contract() {
    init_tracing();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder
        .interaction("move a mount to a new path", "", |mut i| {
            i.given("a generic mount exists at path-a/secret-b");
            i.request
                .method("POST")
                .path("/v1/sys/remount")
                .header("x-vault-token", TEST_TOKEN)
                .json_body(json!({
                    "from": "path-a/secret-b",
                    "to": "path-c/secret-d"
                }));
            i.response
                .status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "data": {
                        "migration_id": "0f6c3b1a-7d44-4b0e-a3a4-6f2a1c9e8d11"
                    }
                }));
            i
        })
        .interaction("check the status of a mount migration", "", |mut i| {
            i.given("migration 0f6c3b1a-7d44-4b0e-a3a4-6f2a1c9e8d11 has completed");
            i.request
                .method("GET")
                .path("/v1/sys/remount/status/0f6c3b1a-7d44-4b0e-a3a4-6f2a1c9e8d11")
                .header("x-vault-token", TEST_TOKEN);
            i.response
                .status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "data": {
                        "migration_id": "0f6c3b1a-7d44-4b0e-a3a4-6f2a1c9e8d11",
                        "migration_info": {
                            "source_mount": "path-a/secret-b/",
                            "target_mount": "path-c/secret-d/",
                            "status": "success"
                        }
                    }
                }));
            i
        });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&base_url(mock_server.url()), Some(TEST_TOKEN));

    client
        .move_mount("path-a/secret-b", "path-c/secret-d")
        .await
        .expect("remount should succeed");
}

#[tokio::test]
async fn test_unmount_contract() {
    init_tracing();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("disable a mount", "", |mut i| {
        i.given("a generic mount exists at team/kv");
        i.request
            .method("DELETE")
            .path("/v1/sys/mounts/team/kv")
            .header("x-vault-token", TEST_TOKEN);
        i.response.status(204);
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&base_url(mock_server.url()), Some(TEST_TOKEN));

    client.unmount("team/kv").await.expect("unmount should succeed");
}

#[tokio::test]
async fn test_permission_denied_contract() {
    init_tracing();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("list mounts with a token lacking sys access", "", |mut i| {
        i.given("the token has no policy for sys/mounts");
        i.request
            .method("GET")
            .path("/v1/sys/mounts")
            .header("x-vault-token", "limited");
        i.response
            .status(403)
            .header("content-type", "application/json")
            .json_body(json!({ "errors": ["permission denied"] }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&base_url(mock_server.url()), Some("limited"));

    let err = client.list_mounts().await.unwrap_err();
    assert!(matches!(err, BackendError::PermissionDenied { .. }), "{err:?}");
}
