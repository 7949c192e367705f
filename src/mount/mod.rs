//! # Mount Model
//!
//! Declared and observed representations of a Vault secret-engine mount.
//!
//! - `spec`: what the orchestrator declares (`MountDeclaration`, `MountSpec`)
//! - `state`: what Vault reports (`MountState`) and how the two compare

mod spec;
mod state;

pub use spec::{EngineType, MountDeclaration, MountSpec};
pub use state::{Drift, DriftField, MountState, ReadOutcome, ReconciliationResult};
