//! # Prelude
//!
//! Re-exports commonly used types and traits.
//!
//! ```rust
//! use vault_mount_controller::prelude::*;
//! ```

// Declared and observed mount model
pub use crate::mount::{
    Drift, DriftField, EngineType, MountDeclaration, MountSpec, MountState, ReadOutcome,
    ReconciliationResult,
};

// Remote API boundary
pub use crate::provider::vault::VaultClient;
pub use crate::provider::{BackendError, MountBackend};

// Reconciler
pub use crate::controller::backoff::RetryPolicy;
pub use crate::controller::reconciler::{MountError, Operation, Reconciler};

// Configuration
pub use crate::config::{ControllerConfig, VaultConfig};
