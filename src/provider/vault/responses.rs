//! Response bodies of the Vault `sys/` endpoints.
//!
//! Vault wraps most payloads in `data` and, for the mount listing and tune
//! endpoints, also repeats them at the top level. Both shapes are accepted.

use crate::provider::{BackendError, MountInfo, MountTtls};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// One entry of `GET /v1/sys/mounts`
#[derive(Debug, Deserialize)]
struct MountEntry {
    #[serde(rename = "type")]
    engine_type: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    accessor: Option<String>,
    #[serde(default)]
    config: MountEntryConfig,
}

/// Configured TTLs; 0 when the mount inherits the system default
#[derive(Debug, Default, Deserialize)]
struct MountEntryConfig {
    #[serde(default)]
    default_lease_ttl: u64,
    #[serde(default)]
    max_lease_ttl: u64,
}

/// Body of `GET /v1/sys/mounts/{path}/tune`
#[derive(Debug, Deserialize)]
struct TuneResponse {
    default_lease_ttl: u64,
    max_lease_ttl: u64,
}

/// Body of `POST /v1/sys/remount`
#[derive(Debug, Deserialize)]
pub(super) struct RemountResponse {
    #[serde(default)]
    pub migration_id: Option<String>,
}

/// Body of `GET /v1/sys/remount/status/{id}`
#[derive(Debug, Deserialize)]
pub(super) struct RemountStatusResponse {
    pub data: RemountStatusData,
}

#[derive(Debug, Deserialize)]
pub(super) struct RemountStatusData {
    pub migration_info: MigrationInfo,
}

#[derive(Debug, Deserialize)]
pub(super) struct MigrationInfo {
    pub status: String,
}

/// Error body shared by every endpoint
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Body of a logical read (`GET /v1/{path}`)
#[derive(Debug, Deserialize)]
pub(super) struct SecretResponse {
    #[serde(default)]
    pub data: serde_json::Map<String, Value>,
}

/// Payload under `data` when present, the body itself otherwise
pub(super) fn unwrap_data(body: &Value) -> &Value {
    match body.get("data") {
        Some(data) if data.is_object() => data,
        _ => body,
    }
}

fn decode_error(what: &str, e: &dyn std::fmt::Display) -> BackendError {
    BackendError::Decode {
        message: format!("{what}: {e}"),
    }
}

pub(super) fn parse_mount_table(body: &Value) -> Result<HashMap<String, MountInfo>, BackendError> {
    let table = unwrap_data(body)
        .as_object()
        .ok_or_else(|| decode_error("mount listing", &"expected a JSON object"))?;

    let mut mounts = HashMap::new();
    for (path, entry) in table {
        // Top-level listings also carry request metadata next to the mounts
        if entry.get("type").is_none() {
            continue;
        }
        let entry: MountEntry = serde_json::from_value(entry.clone())
            .map_err(|e| decode_error(&format!("mount entry '{path}'"), &e))?;
        mounts.insert(
            path.clone(),
            MountInfo {
                engine_type: entry.engine_type,
                description: entry.description,
                accessor: entry.accessor.filter(|a| !a.is_empty()),
                default_lease_ttl: entry.config.default_lease_ttl,
                max_lease_ttl: entry.config.max_lease_ttl,
            },
        );
    }
    Ok(mounts)
}

pub(super) fn parse_tune(body: &Value) -> Result<MountTtls, BackendError> {
    let tune: TuneResponse = serde_json::from_value(unwrap_data(body).clone())
        .map_err(|e| decode_error("mount tune", &e))?;
    Ok(MountTtls {
        default_lease_ttl: tune.default_lease_ttl,
        max_lease_ttl: tune.max_lease_ttl,
    })
}
