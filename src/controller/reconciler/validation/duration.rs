//! # Duration Validation
//!
//! Parses declared lease TTL strings and renders durations back in the
//! canonical `1h40m0s` form used in resource records.
//!
//! Vault exchanges every TTL as integer seconds, so durations here never carry
//! sub-second precision.

use anyhow::Result;
use regex::Regex;
use std::time::Duration;

/// Parse a lease TTL string into a `Duration`
///
/// Accepted forms:
/// - `"0"` or a bare integer, interpreted as seconds (`"3600"`)
/// - one or more `<number><unit>` segments with units `d`, `h`, `m`, `s`
///   (`"30m"`, `"720h"`, `"1h40m0s"`)
///
/// Returns an error describing the first problem found.
pub fn parse_lease_duration(duration_str: &str) -> Result<Duration> {
    let duration_trimmed = duration_str.trim();

    if duration_trimmed.is_empty() {
        return Err(anyhow::anyhow!("Duration string cannot be empty"));
    }

    if duration_trimmed.chars().all(|c| c.is_ascii_digit()) {
        let seconds: u64 = duration_trimmed.parse().map_err(|e| {
            anyhow::anyhow!("Invalid duration number '{duration_trimmed}': {e}")
        })?;
        return Ok(Duration::from_secs(seconds));
    }

    let duration_lower = duration_trimmed.to_lowercase();

    // Whole string must be a sequence of <number><unit> segments
    let shape_regex = Regex::new(r"^(\d+[dhms])+$")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;
    if !shape_regex.is_match(&duration_lower) {
        return Err(anyhow::anyhow!(
            "Invalid duration format '{}'. Expected <number><unit> segments (e.g., '30m', '720h', '1h40m0s')",
            duration_trimmed
        ));
    }

    let segment_regex = Regex::new(r"(?P<number>\d+)(?P<unit>[dhms])")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;

    let mut total_seconds: u64 = 0;
    for captures in segment_regex.captures_iter(&duration_lower) {
        let number_str = captures
            .name("number")
            .ok_or_else(|| {
                anyhow::anyhow!("Failed to extract number from duration '{duration_trimmed}'")
            })?
            .as_str();
        let unit = captures
            .name("unit")
            .ok_or_else(|| {
                anyhow::anyhow!("Failed to extract unit from duration '{duration_trimmed}'")
            })?
            .as_str();

        let number: u64 = number_str.parse().map_err(|e| {
            anyhow::anyhow!("Invalid duration number '{number_str}' in '{duration_trimmed}': {e}")
        })?;

        let multiplier = match unit {
            "s" => 1,
            "m" => 60,
            "h" => 3600,
            "d" => 86400,
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid unit '{unit}' in duration '{duration_trimmed}'. Expected: s, m, h, or d"
                ));
            }
        };

        total_seconds = number
            .checked_mul(multiplier)
            .and_then(|seconds| total_seconds.checked_add(seconds))
            .ok_or_else(|| anyhow::anyhow!("Duration '{duration_trimmed}' is too large"))?;
    }

    Ok(Duration::from_secs(total_seconds))
}

/// Render a duration as hours, minutes and seconds (`720h0m0s`, `30m0s`, `45s`)
///
/// Leading zero components are omitted, so zero renders as `0s`.
#[must_use]
pub fn format_lease_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Convert a duration to the integer seconds Vault expects
#[must_use]
pub fn duration_to_seconds(duration: Duration) -> u64 {
    duration.as_secs()
}

/// Convert integer seconds reported by Vault into a duration
#[must_use]
pub fn seconds_to_duration(seconds: u64) -> Duration {
    Duration::from_secs(seconds)
}
