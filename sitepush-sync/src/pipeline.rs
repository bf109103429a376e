//! Deployment pipeline shared by the CLI and tests.
//!
//! ```text
//! validate ─▶ access check ─▶ workspace ─▶ clone ─▶ reconcile branch
//!          ─▶ synchronize content ─▶ commit (if changed) ─▶ publish
//!          ─▶ workspace teardown (always)
//! ```
//!
//! The first fatal error ends the run. Nothing before the workspace exists has
//! side effects; everything after it runs inside the workspace and is torn
//! down with it.

use std::path::PathBuf;

use sitepush_auth::AccessCheck;
use sitepush_core::{BranchName, BranchState, DeploymentRequest};

use crate::content::SyncReport;
use crate::error::DeployError;
use crate::publish::PushMode;
use crate::workspace::Workspace;
use crate::{branch, clone, commit, content, publish};

/// Terminal state of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// One commit was created and pushed.
    Published {
        path: PathBuf,
        branch: BranchName,
        commit: String,
        forced: bool,
        state: BranchState,
        report: SyncReport,
    },
    /// The branch already held the artifact tree; nothing was committed or pushed.
    NoChanges {
        path: PathBuf,
        branch: BranchName,
        state: BranchState,
        report: SyncReport,
    },
}

impl DeployOutcome {
    /// `published` or `no-changes`.
    pub fn label(&self) -> &'static str {
        match self {
            DeployOutcome::Published { .. } => "published",
            DeployOutcome::NoChanges { .. } => "no-changes",
        }
    }

    /// The artifact tree that was synchronized.
    pub fn path(&self) -> &PathBuf {
        match self {
            DeployOutcome::Published { path, .. } | DeployOutcome::NoChanges { path, .. } => path,
        }
    }

    pub fn branch(&self) -> &BranchName {
        match self {
            DeployOutcome::Published { branch, .. } | DeployOutcome::NoChanges { branch, .. } => {
                branch
            }
        }
    }
}

/// Run one deployment end to end.
pub fn deploy(
    request: &DeploymentRequest,
    access: &dyn AccessCheck,
) -> Result<DeployOutcome, DeployError> {
    request.validate()?;
    access.check(&request.repo, &request.credential)?;

    let workspace = Workspace::acquire(request.workspace_parent.as_deref(), request.keep_workspace)?;
    let result = run_in(&workspace, request);
    workspace.release();

    match &result {
        Ok(outcome) => tracing::info!(
            outcome = outcome.label(),
            branch = %request.branch,
            "deployment finished"
        ),
        Err(error) => tracing::error!(%error, branch = %request.branch, "deployment failed"),
    }
    result
}

fn run_in(workspace: &Workspace, request: &DeploymentRequest) -> Result<DeployOutcome, DeployError> {
    let git = clone::clone_repository(workspace, request)?;
    let state = branch::reconcile(&git, &request.branch)?;
    let report = content::synchronize(&request.artifact_dir, git.dir(), &request.options)?;

    let Some(record) = commit::commit_if_changed(&git, &request.commit_message())? else {
        return Ok(DeployOutcome::NoChanges {
            path: request.artifact_dir.clone(),
            branch: request.branch.clone(),
            state,
            report,
        });
    };

    let mode = publish::publish(&git, &request.branch)?;
    Ok(DeployOutcome::Published {
        path: request.artifact_dir.clone(),
        branch: request.branch.clone(),
        commit: record.sha,
        forced: mode == PushMode::Forced,
        state,
        report,
    })
}
