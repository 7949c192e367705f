//! # Reconciler
//!
//! Keeps one declared Vault mount in sync with the live mount table.
//!
//! The reconciler is a CRUD state machine driven by an orchestrator:
//!
//! - **Create**: mount the engine, then read back effective TTLs
//! - **Read**: list mounts, look up the tracked path, classify as
//!   `InSync`, `Drifted` or `Missing`
//! - **Update**: tune mutable attributes in place, remount on a path change,
//!   refuse engine type changes
//! - **Delete**: unmount, treating an already absent mount as success
//!
//! It holds no state of its own besides the injected backend. Each operation is
//! a fixed sequence of awaited remote calls without retries; retry policy
//! belongs to the caller.

pub mod diff;
mod reconcile;
#[cfg(test)]
pub(crate) mod testing;
mod types;
pub mod validation;

pub use reconcile::{plan_update, UpdatePlan};
pub use types::{MountError, Operation};

use crate::provider::MountBackend;
use std::sync::Arc;
use std::time::Instant;
use tracing::Span;

#[derive(Clone)]
pub struct Reconciler {
    backend: Arc<dyn MountBackend>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(backend: Arc<dyn MountBackend>) -> Self {
        Self { backend }
    }
}

/// Record outcome fields declared on an operation span
fn finish_span(span: &Span, start: Instant, success: bool) {
    span.record("operation.success", success);
    span.record(
        "operation.duration_ms",
        u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
    );
}
