//! # Drift Detection
//!
//! Compares a declared `MountSpec` against freshly observed `MountState`.
//!
//! TTLs are compared in whole seconds, the unit Vault stores. A declared zero
//! TTL asks for the server default, so it is in sync exactly when the mount
//! carries no explicit TTL of its own; comparing it with literal zero would
//! report drift after every zero-TTL create.

use crate::controller::reconciler::validation::{duration_to_seconds, format_lease_duration};
use crate::mount::{Drift, DriftField, MountSpec, MountState, ReconciliationResult};
use std::time::Duration;

const SERVER_DEFAULT: &str = "server default";

/// Compare declaration and observation field by field
#[must_use]
pub fn compare(declared: &MountSpec, observed: &MountState) -> ReconciliationResult {
    let mut drifts = Vec::new();

    if !declared.engine_type.matches_remote(&observed.engine_type) {
        drifts.push(Drift {
            field: DriftField::EngineType,
            declared: declared.engine_type.to_string(),
            observed: observed.engine_type.clone(),
        });
    }

    if declared.description != observed.description {
        drifts.push(Drift {
            field: DriftField::Description,
            declared: declared.description.clone(),
            observed: observed.description.clone(),
        });
    }

    if let Some(drift) = ttl_drift(
        DriftField::DefaultLeaseTtl,
        declared.default_lease_ttl,
        observed.default_lease_ttl,
        observed.inherits_default_lease_ttl,
    ) {
        drifts.push(drift);
    }

    if let Some(drift) = ttl_drift(
        DriftField::MaxLeaseTtl,
        declared.max_lease_ttl,
        observed.max_lease_ttl,
        observed.inherits_max_lease_ttl,
    ) {
        drifts.push(drift);
    }

    if drifts.is_empty() {
        ReconciliationResult::InSync
    } else {
        ReconciliationResult::Drifted(drifts)
    }
}

/// Whether a declared TTL differs from what the mount currently applies
#[must_use]
pub fn ttl_changed(declared: Duration, effective: Duration, inherits_default: bool) -> bool {
    if declared.is_zero() {
        !inherits_default
    } else {
        inherits_default || duration_to_seconds(declared) != duration_to_seconds(effective)
    }
}

fn ttl_drift(
    field: DriftField,
    declared: Duration,
    effective: Duration,
    inherits_default: bool,
) -> Option<Drift> {
    if !ttl_changed(declared, effective, inherits_default) {
        return None;
    }
    Some(Drift {
        field,
        declared: render_ttl(declared, declared.is_zero()),
        observed: render_ttl(effective, inherits_default),
    })
}

fn render_ttl(value: Duration, is_default: bool) -> String {
    if is_default && value.is_zero() {
        SERVER_DEFAULT.to_string()
    } else if is_default {
        format!("{} ({SERVER_DEFAULT})", format_lease_duration(value))
    } else {
        format_lease_duration(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mount::EngineType;

    const DAY_30: Duration = Duration::from_secs(2_764_800);

    fn observed(default_ttl: Duration, max_ttl: Duration, inherits: bool) -> MountState {
        MountState {
            id: "kv".to_string(),
            path: "kv".to_string(),
            engine_type: "generic".to_string(),
            description: "hello world".to_string(),
            accessor: None,
            default_lease_ttl: default_ttl,
            max_lease_ttl: max_ttl,
            inherits_default_lease_ttl: inherits,
            inherits_max_lease_ttl: inherits,
        }
    }

    fn declared(default_ttl: u64, max_ttl: u64) -> MountSpec {
        MountSpec::new("kv", EngineType::Generic)
            .with_description("hello world")
            .with_lease_ttls(Duration::from_secs(default_ttl), Duration::from_secs(max_ttl))
    }

    #[test]
    fn test_zero_ttls_in_sync_with_server_default() {
        let result = compare(&declared(0, 0), &observed(DAY_30, DAY_30, true));
        assert_eq!(result, ReconciliationResult::InSync);
    }

    #[test]
    fn test_zero_ttl_drifts_when_mount_pins_a_value() {
        let result = compare(
            &declared(0, 0),
            &observed(Duration::from_secs(1800), DAY_30, false),
        );
        assert_eq!(
            result.drifted_fields(),
            vec![DriftField::DefaultLeaseTtl, DriftField::MaxLeaseTtl]
        );
    }

    #[test]
    fn test_explicit_ttls_compared_in_seconds() {
        let result = compare(
            &declared(1800, 6000),
            &observed(Duration::from_secs(1800), Duration::from_secs(6000), false),
        );
        assert!(result.is_in_sync());

        let result = compare(
            &declared(3600, 12000),
            &observed(Duration::from_secs(3600), Duration::from_secs(6000), false),
        );
        match result {
            ReconciliationResult::Drifted(drifts) => {
                assert_eq!(drifts.len(), 1);
                assert_eq!(drifts[0].field, DriftField::MaxLeaseTtl);
                assert_eq!(drifts[0].declared, "3h20m0s");
                assert_eq!(drifts[0].observed, "1h40m0s");
            }
            other => panic!("expected drift, got {other:?}"),
        }
    }

    #[test]
    fn test_explicit_ttl_drifts_from_inherited_default() {
        let result = compare(&declared(1800, 0), &observed(DAY_30, DAY_30, true));
        match result {
            ReconciliationResult::Drifted(drifts) => {
                assert_eq!(drifts.len(), 1);
                assert_eq!(drifts[0].observed, "720h0m0s (server default)");
            }
            other => panic!("expected drift, got {other:?}"),
        }
    }

    #[test]
    fn test_engine_type_and_description_drift() {
        let mut state = observed(DAY_30, DAY_30, true);
        state.engine_type = "transit".to_string();
        state.description = "changed out of band".to_string();

        let result = compare(&declared(0, 0), &state);
        assert_eq!(
            result.drifted_fields(),
            vec![DriftField::EngineType, DriftField::Description]
        );
    }

    #[test]
    fn test_generic_matches_kv_report() {
        let mut state = observed(DAY_30, DAY_30, true);
        state.engine_type = "kv".to_string();
        assert!(compare(&declared(0, 0), &state).is_in_sync());
    }
}
