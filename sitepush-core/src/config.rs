//! Optional YAML configuration.
//!
//! # Lookup order
//!
//! ```text
//! --config <path>                      (explicit; must exist)
//! ./sitepush.yaml                      (project-local)
//! <config_dir>/sitepush/config.yaml    (per-user, via `dirs::config_dir()`)
//! ```
//!
//! Every field is optional. Command-line flags override file values, file
//! values override built-in defaults. The token is never read from a file.
//!
//! As with the rest of the workspace, functions that touch the environment have
//! an `_at` form taking explicit directories; tests use only the `_at` forms.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{
    BranchName, CommitIdentity, CommitTemplate, DEFAULT_API_BASE, DEFAULT_BRANCH,
    DEFAULT_COMMIT_MESSAGE, DEFAULT_REMOTE_BASE,
};

pub const LOCAL_CONFIG_FILE: &str = "sitepush.yaml";

/// Commit identity overrides; a missing half falls back to the default bot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// On-disk configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nojekyll: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_workspace: Option<bool>,
}

impl DeployConfig {
    /// A document with every field set to its built-in default.
    pub fn defaults() -> Self {
        let identity = CommitIdentity::default();
        Self {
            branch: Some(DEFAULT_BRANCH.to_string()),
            remote_base: Some(DEFAULT_REMOTE_BASE.to_string()),
            api_base: Some(DEFAULT_API_BASE.to_string()),
            include_hidden: Some(false),
            nojekyll: Some(false),
            cname: None,
            commit_message: Some(DEFAULT_COMMIT_MESSAGE.to_string()),
            identity: Some(IdentityConfig {
                name: Some(identity.name),
                email: Some(identity.email),
            }),
            workspace_dir: None,
            keep_workspace: Some(false),
        }
    }

    /// Fill every unset field from `fallback`.
    pub fn or(self, fallback: DeployConfig) -> Self {
        let identity = match (self.identity, fallback.identity) {
            (Some(mine), Some(theirs)) => Some(IdentityConfig {
                name: mine.name.or(theirs.name),
                email: mine.email.or(theirs.email),
            }),
            (mine, theirs) => mine.or(theirs),
        };
        Self {
            branch: self.branch.or(fallback.branch),
            remote_base: self.remote_base.or(fallback.remote_base),
            api_base: self.api_base.or(fallback.api_base),
            include_hidden: self.include_hidden.or(fallback.include_hidden),
            nojekyll: self.nojekyll.or(fallback.nojekyll),
            cname: self.cname.or(fallback.cname),
            commit_message: self.commit_message.or(fallback.commit_message),
            identity,
            workspace_dir: self.workspace_dir.or(fallback.workspace_dir),
            keep_workspace: self.keep_workspace.or(fallback.keep_workspace),
        }
    }

    pub fn branch_name(&self) -> BranchName {
        self.branch
            .clone()
            .map(BranchName::from)
            .unwrap_or_default()
    }

    pub fn remote_base(&self) -> &str {
        self.remote_base.as_deref().unwrap_or(DEFAULT_REMOTE_BASE)
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn commit_template(&self) -> CommitTemplate {
        self.commit_message
            .clone()
            .map(CommitTemplate)
            .unwrap_or_default()
    }

    pub fn commit_identity(&self) -> CommitIdentity {
        let fallback = CommitIdentity::default();
        match &self.identity {
            Some(id) => CommitIdentity {
                name: id.name.clone().unwrap_or(fallback.name),
                email: id.email.clone().unwrap_or(fallback.email),
            },
            None => fallback,
        }
    }

    /// Field-level checks that do not depend on the deployment inputs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.branch.is_some() {
            self.branch_name().validate()?;
        }
        if self.commit_message.is_some() {
            self.commit_template().validate()?;
        }
        for (field, value) in [
            ("remote_base", self.remote_base.as_deref()),
            ("api_base", self.api_base.as_deref()),
        ] {
            if let Some(value) = value {
                if !value.contains("://") {
                    return Err(ConfigError::Invalid {
                        field,
                        reason: format!("'{value}' is not a URL"),
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 1. Discovery
// ---------------------------------------------------------------------------

/// `<config_dir>/sitepush/config.yaml` (pure, no I/O).
pub fn user_config_path_at(config_dir: &Path) -> PathBuf {
    config_dir.join("sitepush").join("config.yaml")
}

/// First existing config file among the implicit locations.
pub fn discover_at(cwd: &Path, config_dir: Option<&Path>) -> Option<PathBuf> {
    let local = cwd.join(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    config_dir
        .map(user_config_path_at)
        .filter(|path| path.is_file())
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load and validate the config at `path`.
///
/// Returns `ConfigError::NotFound` if absent and `ConfigError::Parse` (with
/// path and line context) if malformed.
pub fn load_at(path: &Path) -> Result<DeployConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(DeployConfig::default());
    }
    let config: DeployConfig = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.validate()?;
    Ok(config)
}

/// Resolve the effective file config for this process.
///
/// An explicit path must exist. Without one, implicit locations are tried and
/// an empty config is returned when none exists.
pub fn resolve(explicit: Option<&Path>) -> Result<(DeployConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = explicit {
        return Ok((load_at(path)?, Some(path.to_path_buf())));
    }
    let cwd = std::env::current_dir()?;
    let config_dir = dirs::config_dir();
    match discover_at(&cwd, config_dir.as_deref()) {
        Some(path) => Ok((load_at(&path)?, Some(path))),
        None => Ok((DeployConfig::default(), None)),
    }
}

// ---------------------------------------------------------------------------
// 3. Save (atomic, create-only)
// ---------------------------------------------------------------------------

/// Write `config` to `path`, refusing to replace an existing file.
///
/// Write flow: serialize → `<name>.tmp` sibling → `rename`.
pub fn create_at(path: &Path, config: &DeployConfig) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let yaml = serde_yaml::to_string(config)?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    std::fs::write(&tmp_path, yaml)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}
