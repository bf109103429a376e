//! `sitepush deploy`: run the deployment pipeline and report the outcome.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use sitepush_auth::{AccessCheck, AuthError, HttpTokenValidator, SkipAccessCheck};
use sitepush_core::{
    Credential, DeployConfig, DeploymentRequest, RepoCoordinates, Revision, SyncOptions,
};
use sitepush_sync::{deploy, DeployOutcome};

use super::effective_config;

/// Arguments for `sitepush deploy`.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Built artifact tree to publish.
    pub dir: PathBuf,

    /// Target repository as `owner/name`.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: RepoCoordinates,

    /// Revision identifier recorded in the commit message.
    #[arg(long, env = "GITHUB_SHA")]
    pub revision: String,

    /// Target branch [default: gh-pages].
    #[arg(long)]
    pub branch: Option<String>,

    /// Access token with push rights.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL that `owner/name.git` is appended to.
    #[arg(long)]
    pub remote_base: Option<String>,

    /// REST API base URL for the access check.
    #[arg(long)]
    pub api_base: Option<String>,

    /// Also publish entries whose name starts with `.`.
    #[arg(long)]
    pub include_hidden: bool,

    /// Write an empty `.nojekyll` at the branch root.
    #[arg(long)]
    pub nojekyll: bool,

    /// Write a `CNAME` file with this domain.
    #[arg(long, value_name = "DOMAIN")]
    pub cname: Option<String>,

    /// Commit message template; `{revision}` is required, `{branch}` optional.
    #[arg(long, value_name = "TEMPLATE")]
    pub message: Option<String>,

    /// Skip the REST access check (local mirrors, hosts without an API).
    #[arg(long)]
    pub skip_token_check: bool,

    /// Leave the workspace on disk after the run.
    #[arg(long)]
    pub keep_workspace: bool,

    /// Emit a machine-readable JSON report on stdout.
    #[arg(long)]
    pub json: bool,
}

/// One-line JSON report.
#[derive(Debug, Serialize)]
struct DeployReport {
    outcome: &'static str,
    path: Option<PathBuf>,
    branch: Option<String>,
    commit: Option<String>,
    forced: Option<bool>,
    reason: Option<String>,
}

impl DeployReport {
    fn from_outcome(outcome: &DeployOutcome) -> Self {
        let (commit, forced) = match outcome {
            DeployOutcome::Published { commit, forced, .. } => (Some(commit.clone()), Some(*forced)),
            DeployOutcome::NoChanges { .. } => (None, None),
        };
        Self {
            outcome: outcome.label(),
            path: Some(outcome.path().clone()),
            branch: Some(outcome.branch().to_string()),
            commit,
            forced,
            reason: None,
        }
    }

    fn failed(reason: String) -> Self {
        Self {
            outcome: "failed",
            path: None,
            branch: None,
            commit: None,
            forced: None,
            reason: Some(reason),
        }
    }
}

impl DeployArgs {
    pub fn run(self, config: Option<&Path>) -> Result<ExitCode> {
        let json = self.json;
        match self.execute(config) {
            Ok(outcome) => {
                report_success(&outcome, json)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                report_failure(&format!("{err:#}"), json)?;
                Ok(ExitCode::FAILURE)
            }
        }
    }

    fn execute(self, config: Option<&Path>) -> Result<DeployOutcome> {
        let config = self.overrides().or(effective_config(config)?);
        config.validate().context("invalid configuration")?;

        let credential = Credential::new(self.token.unwrap_or_default());
        if credential.is_empty() && !self.skip_token_check {
            return Err(AuthError::MissingToken)
                .context("pass --token or set GITHUB_TOKEN");
        }

        let mut request = DeploymentRequest::new(
            self.dir,
            self.repo,
            credential,
            Revision(self.revision),
        );
        request.branch = config.branch_name();
        request.remote_base = config.remote_base().to_string();
        request.identity = config.commit_identity();
        request.message = config.commit_template();
        request.options = SyncOptions {
            include_hidden: config.include_hidden.unwrap_or(false),
            nojekyll: config.nojekyll.unwrap_or(false),
            cname: config.cname.clone(),
        };
        request.workspace_parent = config.workspace_dir.clone();
        request.keep_workspace = config.keep_workspace.unwrap_or(false);

        let access: Box<dyn AccessCheck> = if self.skip_token_check {
            Box::new(SkipAccessCheck)
        } else {
            Box::new(HttpTokenValidator::new(config.api_base()))
        };

        deploy(&request, access.as_ref())
            .with_context(|| format!("deployment to {}:{} failed", request.repo, request.branch))
    }

    /// Values given on the command line; unset flags fall through to config.
    fn overrides(&self) -> DeployConfig {
        DeployConfig {
            branch: self.branch.clone(),
            remote_base: self.remote_base.clone(),
            api_base: self.api_base.clone(),
            include_hidden: self.include_hidden.then_some(true),
            nojekyll: self.nojekyll.then_some(true),
            cname: self.cname.clone(),
            commit_message: self.message.clone(),
            identity: None,
            workspace_dir: None,
            keep_workspace: self.keep_workspace.then_some(true),
        }
    }
}

fn report_success(outcome: &DeployOutcome, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(&DeployReport::from_outcome(outcome))?;
        println!("{line}");
        return Ok(());
    }

    match outcome {
        DeployOutcome::Published {
            path,
            branch,
            commit,
            forced,
            state,
            report,
        } => {
            let short = commit.get(..7).unwrap_or(commit);
            println!(
                "{} published {} to {} at {}{}",
                "✓".green().bold(),
                path.display(),
                branch.to_string().bold(),
                short.yellow(),
                if *forced { " (forced)".red().to_string() } else { String::new() },
            );
            println!(
                "  {} files, {} bytes; branch was {}",
                report.files, report.bytes, state
            );
        }
        DeployOutcome::NoChanges { path, branch, .. } => {
            println!(
                "{} {} already matches {}; nothing to publish",
                "✓".green().bold(),
                branch.to_string().bold(),
                path.display(),
            );
        }
    }
    Ok(())
}

fn report_failure(reason: &str, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(&DeployReport::failed(reason.to_string()))?;
        println!("{line}");
        return Ok(());
    }
    eprintln!("{} {}", "✗".red().bold(), reason);
    Ok(())
}
