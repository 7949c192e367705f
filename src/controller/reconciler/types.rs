//! # Types
//!
//! Error taxonomy of the reconciler and the operation context it carries.

use crate::mount::DriftField;
use crate::provider::BackendError;
use std::fmt;
use thiserror::Error;

/// Reconciler operation, carried in errors and spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Remount,
    Delete,
}

impl Operation {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Remount => "remount",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum MountError {
    /// Declared configuration could not be parsed; raised before any remote call
    #[error("invalid {field} '{value}': {reason}")]
    ConfigParse {
        field: String,
        value: String,
        reason: String,
    },

    #[error("invalid mount path '{path}' for {operation}: {reason}")]
    InvalidPath {
        path: String,
        operation: Operation,
        reason: String,
    },

    /// The path collides with an existing mount
    #[error("mount path '{path}' is already in use: {source}")]
    AlreadyMounted { path: String, source: BackendError },

    #[error("permission denied during {operation} of mount '{path}': {source}")]
    PermissionDenied {
        path: String,
        operation: Operation,
        source: BackendError,
    },

    #[error("mount '{path}' not found during {operation}: {source}")]
    NotFound {
        path: String,
        operation: Operation,
        source: BackendError,
    },

    /// Transport or server-side failure; only the caller retries
    #[error("Vault unavailable during {operation} of mount '{path}': {source}")]
    RemoteUnavailable {
        path: String,
        operation: Operation,
        source: BackendError,
    },

    #[error("{operation} of mount '{path}' failed: {source}")]
    Remote {
        path: String,
        operation: Operation,
        source: BackendError,
    },

    /// The move did not complete; the mount must be read again before any update
    #[error(
        "remount of '{from}' to '{to}' failed (mount config applied: {config_applied}): {source}"
    )]
    RemountFailed {
        from: String,
        to: String,
        config_applied: bool,
        source: BackendError,
    },

    #[error("changing {field} of mount '{path}' from '{from}' to '{to}' requires replacing the mount")]
    ReplacementRequired {
        path: String,
        field: DriftField,
        from: String,
        to: String,
    },

    /// The change went through but the mount could not be read back; the
    /// tracked record must be refreshed before anything is retried
    #[error("{operation} of mount '{path}' was applied but its state could not be read back: {source}")]
    Unconfirmed {
        path: String,
        operation: Operation,
        source: BackendError,
    },

    #[error("failed to delete mount '{path}': {source}")]
    DeleteFailed { path: String, source: BackendError },
}

impl MountError {
    /// Classify a backend failure for `operation` on `path`
    #[must_use]
    pub fn from_backend(source: BackendError, path: &str, operation: Operation) -> Self {
        let path = path.to_string();
        match source {
            BackendError::NotFound { .. } => MountError::NotFound {
                path,
                operation,
                source,
            },
            BackendError::Conflict { .. } => MountError::AlreadyMounted { path, source },
            BackendError::PermissionDenied { .. } => MountError::PermissionDenied {
                path,
                operation,
                source,
            },
            BackendError::Unavailable { .. } => MountError::RemoteUnavailable {
                path,
                operation,
                source,
            },
            BackendError::Rejected { .. } | BackendError::Decode { .. } => MountError::Remote {
                path,
                operation,
                source,
            },
        }
    }

    /// Whether the orchestrator may retry the same call unchanged
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            MountError::RemoteUnavailable { .. } => true,
            MountError::DeleteFailed { source, .. } => {
                matches!(source, BackendError::Unavailable { .. })
            }
            _ => false,
        }
    }

    /// Whether the tracked state is indeterminate and needs a fresh Read
    #[must_use]
    pub fn requires_refresh(&self) -> bool {
        matches!(
            self,
            MountError::RemountFailed { .. } | MountError::Unconfirmed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_errors_are_classified() {
        let err = MountError::from_backend(
            BackendError::Conflict {
                message: "path is already in use at kv/".to_string(),
            },
            "kv",
            Operation::Create,
        );
        assert!(matches!(err, MountError::AlreadyMounted { .. }));

        let err = MountError::from_backend(
            BackendError::Unavailable {
                message: "connection refused".to_string(),
            },
            "kv",
            Operation::Read,
        );
        assert!(err.is_retryable());
        assert!(err.to_string().contains("during read of mount 'kv'"));

        let err = MountError::from_backend(
            BackendError::Rejected {
                status: 400,
                message: "bad".to_string(),
            },
            "kv",
            Operation::Update,
        );
        assert!(matches!(err, MountError::Remote { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_remount_failure_requires_refresh() {
        let err = MountError::RemountFailed {
            from: "a".to_string(),
            to: "b".to_string(),
            config_applied: true,
            source: BackendError::Unavailable {
                message: "timeout".to_string(),
            },
        };
        assert!(err.requires_refresh());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("mount config applied: true"));
    }

    #[test]
    fn test_delete_failure_retryable_only_when_transient() {
        let transient = MountError::DeleteFailed {
            path: "kv".to_string(),
            source: BackendError::Unavailable {
                message: "503".to_string(),
            },
        };
        assert!(transient.is_retryable());

        let denied = MountError::DeleteFailed {
            path: "kv".to_string(),
            source: BackendError::PermissionDenied {
                message: "permission denied".to_string(),
            },
        };
        assert!(!denied.is_retryable());
    }

    #[test]
    fn test_unconfirmed_change_is_refreshed_not_retried() {
        let err = MountError::Unconfirmed {
            path: "path-c/secret-d".to_string(),
            operation: Operation::Update,
            source: BackendError::Unavailable {
                message: "503".to_string(),
            },
        };
        assert!(err.requires_refresh());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("update of mount 'path-c/secret-d' was applied"));
    }
}
