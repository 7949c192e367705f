//! # Controller
//!
//! - `backoff`: Fibonacci backoff and retry policy for transient failures
//! - `reconciler`: mount reconciliation state machine

pub mod backoff;
pub mod reconciler;
