//! # Path Validation
//!
//! Validates mount paths and owns the one place where Vault's trailing-slash
//! mount identifiers are reconciled with declared paths.

use crate::constants::{MAX_MOUNT_PATH_LEN, RESERVED_MOUNT_PATHS};
use anyhow::Result;
use regex::Regex;

/// Normalize a mount identifier
///
/// Vault reports mounts as `secret/` while declarations say `secret`. Leading
/// and trailing separators and surrounding whitespace are dropped.
#[must_use]
pub fn normalize_mount_path(path: &str) -> &str {
    path.trim().trim_matches('/')
}

/// Compare two mount identifiers after normalization
#[must_use]
pub fn same_mount_path(left: &str, right: &str) -> bool {
    normalize_mount_path(left) == normalize_mount_path(right)
}

/// Validate a declared mount path
///
/// The normalized path must be non-empty, slash-segmented without empty
/// segments, free of control characters and whitespace, and must not target a
/// mount owned by Vault itself.
pub fn validate_mount_path(path: &str, field_name: &str) -> Result<()> {
    let normalized = normalize_mount_path(path);

    if normalized.is_empty() {
        return Err(anyhow::anyhow!("{field_name} cannot be empty"));
    }

    if normalized.len() > MAX_MOUNT_PATH_LEN {
        return Err(anyhow::anyhow!(
            "{} '{}' exceeds maximum length of {} characters (got {})",
            field_name,
            normalized,
            MAX_MOUNT_PATH_LEN,
            normalized.len()
        ));
    }

    if normalized.chars().any(char::is_control) {
        return Err(anyhow::anyhow!(
            "{field_name} '{normalized}' contains control characters"
        ));
    }

    // Segments: no whitespace, no '..', no empty segment from '//'
    let segment_regex = Regex::new(r"^[^/\s]+(/[^/\s]+)*$")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;
    if !segment_regex.is_match(normalized) {
        return Err(anyhow::anyhow!(
            "{field_name} '{normalized}' must be slash-separated segments without empty parts or whitespace (e.g., 'team/secret')"
        ));
    }

    if normalized.split('/').any(|segment| segment == "." || segment == "..") {
        return Err(anyhow::anyhow!(
            "{field_name} '{normalized}' cannot contain '.' or '..' segments"
        ));
    }

    let first_segment = normalized.split('/').next().unwrap_or(normalized);
    if RESERVED_MOUNT_PATHS.contains(&first_segment) {
        return Err(anyhow::anyhow!(
            "{field_name} '{normalized}' is reserved by Vault"
        ));
    }

    Ok(())
}
