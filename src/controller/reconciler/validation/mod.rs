//! # Validation
//!
//! Validates declared mount configuration before any remote call is made.

mod duration;
mod paths;

pub use duration::{
    duration_to_seconds, format_lease_duration, parse_lease_duration, seconds_to_duration,
};
pub use paths::{normalize_mount_path, same_mount_path, validate_mount_path};
