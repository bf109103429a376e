//! Blocking `git` subprocess runner bound to one directory and one run.
//!
//! Identity is injected per invocation, as `-c user.name=… -c user.email=…`
//! and through the `GIT_AUTHOR_*` / `GIT_COMMITTER_*` variables of the child
//! process. Nothing is written to git config files or to this process's
//! environment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use sitepush_core::{CommitIdentity, Credential};

/// Variables that would redirect git away from the directory we point it at.
const SCRUBBED_ENV: &[&str] = &["GIT_DIR", "GIT_WORK_TREE", "GIT_INDEX_FILE", "GIT_PREFIX"];

/// A git invocation that could not be started or exited non-zero.
#[derive(Debug, Clone, Error)]
#[error("`git {command}` failed ({status}): {stderr}")]
pub struct GitFailure {
    /// Display form of the arguments; secret-bearing arguments are redacted.
    pub command: String,
    pub status: String,
    /// Trimmed stderr with the credential scrubbed out.
    pub stderr: String,
}

pub struct Git {
    dir: PathBuf,
    identity: CommitIdentity,
    secret: Credential,
}

impl fmt::Debug for Git {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Git")
            .field("dir", &self.dir)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl Git {
    /// `secret` is only used to scrub subprocess output.
    pub fn new(dir: impl Into<PathBuf>, identity: CommitIdentity, secret: Credential) -> Self {
        Self {
            dir: dir.into(),
            identity,
            secret,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Same identity and secret, different working directory.
    pub fn at(&self, dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            identity: self.identity.clone(),
            secret: self.secret.clone(),
        }
    }

    /// Run `git <args>` and return trimmed stdout.
    pub fn run(&self, args: &[&str]) -> Result<String, GitFailure> {
        self.exec(args, &args.join(" ")).map(|out| out.trim().to_string())
    }

    /// Run `git <args>` and return stdout exactly as printed. For formats
    /// where leading whitespace is significant (`status --porcelain`).
    pub fn run_raw(&self, args: &[&str]) -> Result<String, GitFailure> {
        self.exec(args, &args.join(" "))
    }

    /// Like [`Git::run`], but only `shown` is ever logged or put in errors.
    pub fn run_redacted(&self, args: &[&str], shown: &str) -> Result<String, GitFailure> {
        self.exec(args, shown).map(|out| out.trim().to_string())
    }

    fn exec(&self, args: &[&str], shown: &str) -> Result<String, GitFailure> {
        tracing::debug!(dir = %self.dir.display(), "git {shown}");

        let output = self
            .command()
            .args(args)
            .output()
            .map_err(|e| GitFailure {
                command: shown.to_string(),
                status: "not started".to_string(),
                stderr: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        Err(GitFailure {
            command: shown.to_string(),
            status: output.status.to_string(),
            stderr: self.secret.scrub(&stderr),
        })
    }

    fn command(&self) -> Command {
        let user_name = format!("user.name={}", self.identity.name);
        let user_email = format!("user.email={}", self.identity.email);
        let mut cmd = Command::new("git");
        for var in SCRUBBED_ENV {
            cmd.env_remove(var);
        }
        cmd.current_dir(&self.dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C")
            .env("GIT_AUTHOR_NAME", &self.identity.name)
            .env("GIT_AUTHOR_EMAIL", &self.identity.email)
            .env("GIT_COMMITTER_NAME", &self.identity.name)
            .env("GIT_COMMITTER_EMAIL", &self.identity.email)
            .args(["-c", user_name.as_str(), "-c", user_email.as_str()])
            .args(["-c", "commit.gpgsign=false", "-c", "core.autocrlf=false"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}
