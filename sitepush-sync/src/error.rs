//! Error types for sitepush-sync.
//!
//! One variant per pipeline stage, in pipeline order. Cleanup failures are not
//! represented here: they are logged as warnings and never abort a run.

use std::path::PathBuf;

use thiserror::Error;

use sitepush_auth::AuthError;
use sitepush_core::ConfigError;

use crate::git::GitFailure;

/// The single consolidated failure a deployment run reports.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Pre-flight: the token cannot be used for this repository.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Pre-flight: the request itself is unusable.
    #[error("invalid deployment request: {0}")]
    Validation(#[from] ConfigError),

    /// Cloning (which includes fetching every branch) or installing the
    /// authenticated remote failed.
    #[error("clone failed: {0}")]
    Clone(#[source] GitFailure),

    /// Local checkout, remote tracking and orphan creation all failed.
    #[error("could not prepare branch '{branch}': {reason}")]
    BranchReconciliation { branch: String, reason: String },

    /// Copying the artifact tree into the workspace failed at `path`.
    #[error("content sync failed at {path}: {source}")]
    Sync {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("commit failed: {0}")]
    Commit(#[source] GitFailure),

    /// Plain push failed and, if it was a rejection, so did the forced retry.
    #[error("publish failed: {0}")]
    Publish(#[source] GitFailure),

    /// Workspace creation and other I/O outside the synced tree.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`DeployError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DeployError {
    DeployError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`DeployError::Sync`].
pub(crate) fn sync_err(path: impl Into<PathBuf>, source: std::io::Error) -> DeployError {
    DeployError::Sync {
        path: path.into(),
        source,
    }
}
