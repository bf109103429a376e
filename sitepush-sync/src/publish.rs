//! Push the deployment commit, overwriting the remote branch if it diverged.

use sitepush_core::BranchName;

use crate::error::DeployError;
use crate::git::{Git, GitFailure};

/// How the remote branch was updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    FastForward,
    /// The plain push was rejected and the forced retry succeeded.
    Forced,
}

/// Markers git prints (with `LC_ALL=C`) when the remote has commits the local
/// branch lacks.
const REJECTION_MARKERS: &[&str] = &[
    "[rejected]",
    "non-fast-forward",
    "fetch first",
    "updates were rejected",
    "stale info",
];

fn is_rejection(failure: &GitFailure) -> bool {
    let stderr = failure.stderr.to_ascii_lowercase();
    REJECTION_MARKERS.iter().any(|marker| stderr.contains(marker))
}

/// Push `branch` to `origin`. A non-fast-forward rejection is retried once
/// with `--force`; any other failure, or a failed retry, is fatal.
pub fn publish(git: &Git, branch: &BranchName) -> Result<PushMode, DeployError> {
    let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch.0);

    match git.run(&["push", "--quiet", "origin", &refspec]) {
        Ok(_) => {
            tracing::info!(branch = %branch, "pushed");
            Ok(PushMode::FastForward)
        }
        Err(failure) if is_rejection(&failure) => {
            tracing::warn!(
                branch = %branch,
                error = %failure,
                "push rejected; remote branch diverged, retrying with --force"
            );
            git.run(&["push", "--quiet", "--force", "origin", &refspec])
                .map_err(DeployError::Publish)?;
            tracing::info!(branch = %branch, "force-pushed");
            Ok(PushMode::Forced)
        }
        Err(failure) => Err(DeployError::Publish(failure)),
    }
}
