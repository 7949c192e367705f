//! Request bodies for the Vault `sys/` mount endpoints.

use serde::Serialize;

/// Body of `POST /v1/sys/mounts/{path}`
#[derive(Debug, Serialize)]
pub(super) struct EnableMountRequest<'a> {
    #[serde(rename = "type")]
    pub engine_type: &'a str,
    pub description: &'a str,
    pub config: EnableMountConfig,
}

/// TTLs are left out when zero so Vault applies its own defaults
#[derive(Debug, Serialize)]
pub(super) struct EnableMountConfig {
    #[serde(skip_serializing_if = "is_zero")]
    pub default_lease_ttl: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub max_lease_ttl: u64,
}

/// Body of `POST /v1/sys/mounts/{path}/tune`
#[derive(Debug, Serialize)]
pub(super) struct TuneMountRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub default_lease_ttl: TuneTtl,
    pub max_lease_ttl: TuneTtl,
}

/// TTL value on the tune endpoint
///
/// Vault keeps an explicit TTL when tuned with `0`; only `"system"` resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TuneTtl {
    Seconds(u64),
    System,
}

impl Serialize for TuneTtl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TuneTtl::Seconds(seconds) => serializer.serialize_u64(*seconds),
            TuneTtl::System => serializer.serialize_str("system"),
        }
    }
}

impl From<u64> for TuneTtl {
    fn from(seconds: u64) -> Self {
        if seconds == 0 {
            TuneTtl::System
        } else {
            TuneTtl::Seconds(seconds)
        }
    }
}

/// Body of `POST /v1/sys/remount`
#[derive(Debug, Serialize)]
pub(super) struct RemountRequest<'a> {
    pub from: &'a str,
    pub to: &'a str,
}

#[allow(
    clippy::trivially_copy_pass_by_ref,
    reason = "serde skip_serializing_if passes fields by reference"
)]
fn is_zero(value: &u64) -> bool {
    *value == 0
}
