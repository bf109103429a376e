//! Domain types for a single deployment run.
//!
//! All path fields use `PathBuf`. Secret-bearing values live in
//! [`crate::secret`] and never render their contents through `Debug`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::secret::Credential;

/// Publishing branch used when nothing else is configured.
pub const DEFAULT_BRANCH: &str = "gh-pages";
/// Base URL that `owner/name` is appended to when cloning.
pub const DEFAULT_REMOTE_BASE: &str = "https://github.com";
/// REST API root used for the token access check.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
/// Commit message template; `{revision}` is mandatory, `{branch}` optional.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Deploy {revision} to {branch}";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name of the branch that receives the artifact tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchName(pub String);

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for BranchName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BranchName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Default for BranchName {
    fn default() -> Self {
        Self::from(DEFAULT_BRANCH)
    }
}

/// Characters `git check-ref-format` never accepts in a ref.
const REF_FORBIDDEN_CHARS: &[char] = &[' ', '~', '^', ':', '?', '*', '[', '\\'];

impl BranchName {
    /// Reject names git would refuse (`git check-ref-format --branch`) or
    /// misinterpret as options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match ref_format_violation(&self.0) {
            Some(reason) => Err(ConfigError::Invalid {
                field: "branch",
                reason: format!("'{}' {reason}", self.0),
            }),
            None => Ok(()),
        }
    }
}

fn ref_format_violation(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("is empty");
    }
    if name.starts_with('-') {
        return Some("must not start with '-'");
    }
    if name == "@" || name == "HEAD" {
        return Some("is reserved");
    }
    if name.chars().any(|c| c.is_control() || REF_FORBIDDEN_CHARS.contains(&c)) {
        return Some("contains a character git does not allow in refs");
    }
    if name.contains("..") || name.contains("@{") {
        return Some("must not contain '..' or '@{'");
    }
    if name.starts_with('/') || name.ends_with('/') || name.contains("//") {
        return Some("has an empty path component");
    }
    if name.ends_with('.') {
        return Some("must not end with '.'");
    }
    for component in name.split('/') {
        if component.starts_with('.') {
            return Some("has a path component starting with '.'");
        }
        if component.ends_with(".lock") {
            return Some("has a path component ending with '.lock'");
        }
    }
    None
}

/// Source revision the artifact tree was built from (usually a commit SHA).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Revision(pub String);

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Revision {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Revision {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// `owner/name` pair identifying the target repository on the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoCoordinates {
    pub owner: String,
    pub name: String,
}

impl RepoCoordinates {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `<remote_base>/<owner>/<name>.git`, never with credentials.
    pub fn clone_url(&self, remote_base: &str) -> String {
        format!(
            "{}/{}/{}.git",
            remote_base.trim_end_matches('/'),
            self.owner,
            self.name
        )
    }
}

impl fmt::Display for RepoCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoCoordinates {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches(".git");
        let mut parts = trimmed.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if is_slug(owner) && is_slug(name) => {
                Ok(Self::new(owner, name))
            }
            _ => Err(ConfigError::InvalidRepository(s.to_string())),
        }
    }
}

fn is_slug(part: &str) -> bool {
    !part.is_empty()
        && part != "."
        && part != ".."
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

// ---------------------------------------------------------------------------
// Commit metadata
// ---------------------------------------------------------------------------

/// Author/committer identity passed to every git invocation of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

impl Default for CommitIdentity {
    fn default() -> Self {
        Self {
            name: "github-actions[bot]".to_string(),
            email: "41898282+github-actions[bot]@users.noreply.github.com".to_string(),
        }
    }
}

/// Commit message template with `{revision}` and `{branch}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitTemplate(pub String);

impl Default for CommitTemplate {
    fn default() -> Self {
        Self(DEFAULT_COMMIT_MESSAGE.to_string())
    }
}

impl CommitTemplate {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.0.contains("{revision}") {
            Ok(())
        } else {
            Err(ConfigError::Invalid {
                field: "commit_message",
                reason: "template must contain the {revision} placeholder".to_string(),
            })
        }
    }

    /// Substitute placeholders in one left-to-right pass, so placeholder
    /// text inside the substituted values is left alone.
    pub fn render(&self, revision: &Revision, branch: &BranchName) -> String {
        let mut out = String::with_capacity(self.0.len() + revision.0.len());
        let mut rest = self.0.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            if let Some(after) = tail.strip_prefix("{revision}") {
                out.push_str(&revision.0);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{branch}") {
                out.push_str(&branch.0);
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Content options applied while copying the artifact tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Copy entries whose name starts with `.`.
    pub include_hidden: bool,
    /// Write an empty `.nojekyll` marker at the branch root.
    pub nojekyll: bool,
    /// Write a `CNAME` file with this custom domain.
    pub cname: Option<String>,
}

/// Everything one deployment run needs. Not mutated once the run starts.
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    pub artifact_dir: PathBuf,
    pub branch: BranchName,
    pub repo: RepoCoordinates,
    pub credential: Credential,
    pub revision: Revision,
    pub remote_base: String,
    pub identity: CommitIdentity,
    pub options: SyncOptions,
    pub message: CommitTemplate,
    /// Parent for the ephemeral workspace; system temp dir when `None`.
    pub workspace_parent: Option<PathBuf>,
    pub keep_workspace: bool,
}

impl DeploymentRequest {
    pub fn new(
        artifact_dir: impl Into<PathBuf>,
        repo: RepoCoordinates,
        credential: Credential,
        revision: Revision,
    ) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
            branch: BranchName::default(),
            repo,
            credential,
            revision,
            remote_base: DEFAULT_REMOTE_BASE.to_string(),
            identity: CommitIdentity::default(),
            options: SyncOptions::default(),
            message: CommitTemplate::default(),
            workspace_parent: None,
            keep_workspace: false,
        }
    }

    pub fn clone_url(&self) -> String {
        self.repo.clone_url(&self.remote_base)
    }

    pub fn commit_message(&self) -> String {
        self.message.render(&self.revision, &self.branch)
    }

    /// Pre-flight checks that need no I/O beyond looking at the artifact dir.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.branch.validate()?;
        self.message.validate()?;
        if self.revision.0.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "revision",
                reason: "revision identifier is empty".to_string(),
            });
        }
        if let Some(cname) = &self.options.cname {
            if cname.trim().is_empty() || cname.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid {
                    field: "cname",
                    reason: format!("'{cname}' is not a valid domain"),
                });
            }
        }
        if !self.artifact_dir.is_dir() {
            return Err(ConfigError::Invalid {
                field: "artifact_dir",
                reason: format!("{} is not a directory", self.artifact_dir.display()),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Branch state
// ---------------------------------------------------------------------------

/// Where the target branch was found when the workspace was reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchState {
    Absent,
    LocalOnly,
    RemoteOnly,
    LocalAndRemote,
}

impl fmt::Display for BranchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchState::Absent => write!(f, "absent"),
            BranchState::LocalOnly => write!(f, "local-only"),
            BranchState::RemoteOnly => write!(f, "remote-only"),
            BranchState::LocalAndRemote => write!(f, "local-and-remote"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
