//! Stage the synchronized tree and commit it if anything changed.

use crate::error::DeployError;
use crate::git::Git;

/// The one commit a run may create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    /// Paths reported by `git status` before committing.
    pub changed_paths: usize,
}

/// Stage everything (ignored files included) and list changed paths.
pub fn stage_all(git: &Git) -> Result<Vec<String>, DeployError> {
    git.run(&["add", "--all", "--force"])
        .map_err(DeployError::Commit)?;
    let status = git
        .run_raw(&["status", "--porcelain", "-z", "--untracked-files=all"])
        .map_err(DeployError::Commit)?;
    Ok(parse_porcelain_z(&status))
}

/// Paths from `status --porcelain -z`. Entries are `XY <path>` separated by
/// NUL; renames and copies are followed by an extra entry holding the source
/// path, which is skipped.
fn parse_porcelain_z(status: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut entries = status.split('\0').filter(|entry| !entry.is_empty());
    while let Some(entry) = entries.next() {
        let Some(path) = entry.get(3..).filter(|path| !path.is_empty()) else {
            continue;
        };
        paths.push(path.to_string());
        if matches!(entry.as_bytes().first(), Some(b'R' | b'C')) {
            entries.next();
        }
    }
    paths
}

/// Commit the staged tree with `message`, or return `None` when the tree is
/// identical to the branch's current commit.
pub fn commit_if_changed(git: &Git, message: &str) -> Result<Option<CommitRecord>, DeployError> {
    let changed = stage_all(git)?;
    if changed.is_empty() {
        tracing::info!("no changes to commit");
        return Ok(None);
    }

    tracing::debug!(paths = ?changed.iter().take(10).collect::<Vec<_>>(), "changed paths");
    git.run(&["commit", "--quiet", "--no-verify", "-m", message])
        .map_err(DeployError::Commit)?;
    let sha = git
        .run(&["rev-parse", "HEAD"])
        .map_err(DeployError::Commit)?;

    tracing::info!(commit = %sha, changed = changed.len(), "committed");
    Ok(Some(CommitRecord {
        sha,
        changed_paths: changed.len(),
    }))
}
