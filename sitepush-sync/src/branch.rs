//! Bring the checkout onto the target branch.
//!
//! ```text
//! Start ─▶ ProbeLocal ──ok──▶ UseLocal ─(pull, failure tolerated)─▶ Ready
//!              │
//!             err
//!              ▼
//!         ProbeRemote ──ok──▶ TrackRemote ─▶ Ready
//!              │
//!             err
//!              ▼
//!         CreateOrphan ──ok──▶ Ready
//!              │
//!             err ─▶ DeployError::BranchReconciliation
//! ```
//!
//! Failed probes are ordinary transitions, not errors. Only a failed
//! `CreateOrphan` ends the machine with an error.

use sitepush_core::{BranchName, BranchState};

use crate::error::DeployError;
use crate::git::{Git, GitFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Start,
    ProbeLocal,
    ProbeRemote,
    UseLocal,
    TrackRemote,
    CreateOrphan,
    Ready(BranchState),
}

struct Reconciler<'a> {
    git: &'a Git,
    branch: &'a str,
    /// Probe failures, reported only if every path fails.
    failures: Vec<GitFailure>,
}

impl Reconciler<'_> {
    fn next(&mut self, step: Step) -> Result<Step, DeployError> {
        let next = match step {
            Step::Start => Step::ProbeLocal,
            Step::ProbeLocal => match self
                .git
                .run(&["checkout", "--quiet", "--no-guess", self.branch, "--"])
            {
                Ok(_) => Step::UseLocal,
                Err(failure) => self.fall_through(failure, Step::ProbeRemote),
            },
            Step::UseLocal => match self
                .git
                .run(&["pull", "--quiet", "--ff-only", "origin", self.branch])
            {
                Ok(_) => Step::Ready(BranchState::LocalAndRemote),
                Err(failure) => {
                    tracing::warn!(
                        branch = self.branch,
                        error = %failure,
                        "pull failed; continuing with local branch state"
                    );
                    Step::Ready(BranchState::LocalOnly)
                }
            },
            Step::ProbeRemote => {
                let remote_ref = format!("origin/{}", self.branch);
                match self
                    .git
                    .run(&["checkout", "--quiet", "-b", self.branch, "--track", &remote_ref])
                {
                    Ok(_) => Step::TrackRemote,
                    Err(failure) => self.fall_through(failure, Step::CreateOrphan),
                }
            }
            Step::TrackRemote => Step::Ready(BranchState::RemoteOnly),
            Step::CreateOrphan => match self.create_orphan() {
                Ok(()) => Step::Ready(BranchState::Absent),
                Err(failure) => {
                    self.failures.push(failure);
                    return Err(self.exhausted());
                }
            },
            Step::Ready(state) => Step::Ready(state),
        };
        tracing::debug!(from = ?step, to = ?next, "branch reconciliation step");
        Ok(next)
    }

    fn fall_through(&mut self, failure: GitFailure, next: Step) -> Step {
        tracing::debug!(branch = self.branch, error = %failure, "probe failed");
        self.failures.push(failure);
        next
    }

    /// New branch with no parent and an empty index and work tree.
    fn create_orphan(&self) -> Result<(), GitFailure> {
        self.git.run(&["checkout", "--quiet", "--orphan", self.branch])?;
        self.git
            .run(&["rm", "-r", "-f", "-q", "--ignore-unmatch", "--", "."])?;
        Ok(())
    }

    fn exhausted(&self) -> DeployError {
        let reason = self
            .failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        DeployError::BranchReconciliation {
            branch: self.branch.to_string(),
            reason,
        }
    }
}

/// Check out `branch`, creating it if needed, and report where it was found.
pub fn reconcile(git: &Git, branch: &BranchName) -> Result<BranchState, DeployError> {
    let mut reconciler = Reconciler {
        git,
        branch: &branch.0,
        failures: Vec::new(),
    };

    let mut step = Step::Start;
    loop {
        step = reconciler.next(step)?;
        if let Step::Ready(state) = step {
            tracing::info!(branch = %branch, %state, "branch ready");
            return Ok(state);
        }
    }
}
