//! # Declared Mount Configuration
//!
//! `MountDeclaration` is the flat, string-typed attribute set an orchestrator
//! hands over. It is parsed exactly once into a `MountSpec`; nothing downstream
//! compares raw duration strings.

use crate::constants::DEFAULT_MOUNT_DESCRIPTION;
use crate::controller::reconciler::validation::{
    normalize_mount_path, parse_lease_duration, validate_mount_path,
};
use crate::controller::reconciler::{MountError, Operation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Secret engine selected for a mount
///
/// Only the generic key/value engine has dedicated handling. Any other engine
/// name is carried as data and compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EngineType {
    /// Generic key/value engine, reported by newer Vault versions as `kv`
    Generic,
    Custom(String),
}

impl EngineType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            EngineType::Generic => "generic",
            EngineType::Custom(name) => name,
        }
    }

    /// Whether the engine type reported by Vault denotes this engine
    #[must_use]
    pub fn matches_remote(&self, remote: &str) -> bool {
        match self {
            EngineType::Generic => remote == "generic" || remote == "kv",
            EngineType::Custom(name) => name == remote,
        }
    }
}

impl From<&str> for EngineType {
    fn from(value: &str) -> Self {
        match value.trim() {
            "generic" => EngineType::Generic,
            other => EngineType::Custom(other.to_string()),
        }
    }
}

impl From<String> for EngineType {
    fn from(value: String) -> Self {
        EngineType::from(value.as_str())
    }
}

impl From<EngineType> for String {
    fn from(value: EngineType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared mount attributes as supplied by the orchestrator
///
/// ```yaml
/// type: generic
/// path: team-a/secrets
/// description: hello world
/// default_lease_ttl: 30m
/// max_lease_ttl: 100m
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountDeclaration {
    /// Defaults to the engine type when omitted
    #[serde(default)]
    pub path: Option<String>,
    #[serde(rename = "type")]
    pub engine_type: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Empty or omitted means "use the server default"
    #[serde(default)]
    pub default_lease_ttl: Option<String>,
    #[serde(default)]
    pub max_lease_ttl: Option<String>,
}

impl MountDeclaration {
    /// Parse the declaration into a validated `MountSpec`
    ///
    /// # Errors
    /// Returns `MountError::ConfigParse` for malformed TTLs or an empty engine
    /// type and `MountError::InvalidPath` for an unusable path.
    pub fn into_spec(self) -> Result<MountSpec, MountError> {
        let engine_type = self.engine_type.trim().to_string();
        if engine_type.is_empty() {
            return Err(MountError::ConfigParse {
                field: "type".to_string(),
                value: self.engine_type,
                reason: "engine type cannot be empty".to_string(),
            });
        }

        let path = self
            .path
            .filter(|p| !normalize_mount_path(p).is_empty())
            .unwrap_or_else(|| engine_type.clone());

        let spec = MountSpec {
            path: normalize_mount_path(&path).to_string(),
            engine_type: EngineType::from(engine_type),
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_MOUNT_DESCRIPTION.to_string()),
            default_lease_ttl: parse_declared_ttl("default_lease_ttl", self.default_lease_ttl)?,
            max_lease_ttl: parse_declared_ttl("max_lease_ttl", self.max_lease_ttl)?,
        };
        spec.validate(Operation::Create)?;
        Ok(spec)
    }
}

fn parse_declared_ttl(field: &str, value: Option<String>) -> Result<Duration, MountError> {
    match value {
        None => Ok(Duration::ZERO),
        Some(raw) if raw.trim().is_empty() => Ok(Duration::ZERO),
        Some(raw) => parse_lease_duration(&raw).map_err(|e| MountError::ConfigParse {
            field: field.to_string(),
            value: raw,
            reason: e.to_string(),
        }),
    }
}

/// Declared, parsed mount configuration
///
/// A zero TTL means "use the server default".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec {
    /// Normalized path, no leading or trailing separator
    pub path: String,
    pub engine_type: EngineType,
    pub description: String,
    pub default_lease_ttl: Duration,
    pub max_lease_ttl: Duration,
}

impl MountSpec {
    #[must_use]
    pub fn new(path: &str, engine_type: EngineType) -> Self {
        Self {
            path: normalize_mount_path(path).to_string(),
            engine_type,
            description: DEFAULT_MOUNT_DESCRIPTION.to_string(),
            default_lease_ttl: Duration::ZERO,
            max_lease_ttl: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    #[must_use]
    pub fn with_lease_ttls(mut self, default_lease_ttl: Duration, max_lease_ttl: Duration) -> Self {
        self.default_lease_ttl = default_lease_ttl;
        self.max_lease_ttl = max_lease_ttl;
        self
    }

    /// Validate path and engine type
    ///
    /// # Errors
    /// Returns `MountError::InvalidPath` or `MountError::ConfigParse`.
    pub fn validate(&self, operation: Operation) -> Result<(), MountError> {
        validate_mount_path(&self.path, "path").map_err(|e| MountError::InvalidPath {
            path: self.path.clone(),
            operation,
            reason: e.to_string(),
        })?;

        if self.engine_type.as_str().trim().is_empty() {
            return Err(MountError::ConfigParse {
                field: "type".to_string(),
                value: String::new(),
                reason: "engine type cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
