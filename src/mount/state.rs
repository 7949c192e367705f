//! # Observed Mount State
//!
//! State read back from Vault and the outcome of comparing it to a declaration.

use crate::controller::reconciler::validation::{format_lease_duration, parse_lease_duration};
use crate::mount::MountSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Mount as observed in Vault
///
/// TTLs are effective values: a mount without explicit TTLs reports the server
/// default here, never zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountState {
    /// Primary ID, the normalized path
    pub id: String,
    pub path: String,
    #[serde(rename = "type")]
    pub engine_type: String,
    pub description: String,
    /// Assigned by Vault; `None` only on a provisional record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessor: Option<String>,
    #[serde(with = "lease_ttl")]
    pub default_lease_ttl: Duration,
    #[serde(with = "lease_ttl")]
    pub max_lease_ttl: Duration,
    /// Vault has no explicit default TTL for the mount and applies its own
    #[serde(default)]
    pub inherits_default_lease_ttl: bool,
    #[serde(default)]
    pub inherits_max_lease_ttl: bool,
}

impl MountState {
    /// Record built from the declaration alone, for a mount whose change went
    /// through but could not be read back
    ///
    /// Tracking it keeps the mount from being orphaned; the next Read replaces
    /// every attribute with what Vault reports.
    #[must_use]
    pub fn provisional(spec: &MountSpec) -> Self {
        Self {
            id: spec.path.clone(),
            path: spec.path.clone(),
            engine_type: spec.engine_type.as_str().to_string(),
            description: spec.description.clone(),
            accessor: None,
            default_lease_ttl: spec.default_lease_ttl,
            max_lease_ttl: spec.max_lease_ttl,
            inherits_default_lease_ttl: spec.default_lease_ttl.is_zero(),
            inherits_max_lease_ttl: spec.max_lease_ttl.is_zero(),
        }
    }

    /// Flat attribute record handed back to the orchestrator
    #[must_use]
    pub fn to_attributes(&self) -> BTreeMap<String, String> {
        let mut attributes = BTreeMap::new();
        attributes.insert("id".to_string(), self.id.clone());
        attributes.insert("path".to_string(), self.path.clone());
        attributes.insert("type".to_string(), self.engine_type.clone());
        attributes.insert("description".to_string(), self.description.clone());
        if let Some(accessor) = &self.accessor {
            attributes.insert("accessor".to_string(), accessor.clone());
        }
        attributes.insert(
            "default_lease_ttl".to_string(),
            format_lease_duration(self.default_lease_ttl),
        );
        attributes.insert(
            "max_lease_ttl".to_string(),
            format_lease_duration(self.max_lease_ttl),
        );
        attributes
    }
}

/// Attribute that diverged between declaration and Vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriftField {
    EngineType,
    Description,
    DefaultLeaseTtl,
    MaxLeaseTtl,
}

impl DriftField {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DriftField::EngineType => "type",
            DriftField::Description => "description",
            DriftField::DefaultLeaseTtl => "default_lease_ttl",
            DriftField::MaxLeaseTtl => "max_lease_ttl",
        }
    }

    /// Whether Vault can change this attribute without replacing the mount
    #[must_use]
    pub fn is_mutable(&self) -> bool {
        !matches!(self, DriftField::EngineType)
    }
}

impl fmt::Display for DriftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diverged attribute with both sides rendered for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drift {
    pub field: DriftField,
    pub declared: String,
    pub observed: String,
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: declared {:?}, observed {:?}",
            self.field, self.declared, self.observed
        )
    }
}

/// Outcome of a Read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationResult {
    InSync,
    Drifted(Vec<Drift>),
    /// Mount no longer exists remotely; the orchestrator should recreate it
    Missing,
}

impl ReconciliationResult {
    #[must_use]
    pub fn is_in_sync(&self) -> bool {
        matches!(self, ReconciliationResult::InSync)
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, ReconciliationResult::Missing)
    }

    #[must_use]
    pub fn drifted_fields(&self) -> Vec<DriftField> {
        match self {
            ReconciliationResult::Drifted(drifts) => drifts.iter().map(|d| d.field).collect(),
            _ => Vec::new(),
        }
    }
}

/// Read result together with the freshly observed state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    pub result: ReconciliationResult,
    /// `None` when the mount is missing
    pub state: Option<MountState>,
}

/// Serde adapter storing TTLs in the record form (`1h40m0s`)
mod lease_ttl {
    use super::{format_lease_duration, parse_lease_duration};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_lease_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_lease_duration(&raw).map_err(serde::de::Error::custom)
    }
}
