pub mod check_token;
pub mod config;
pub mod deploy;

use std::path::Path;

use anyhow::{Context, Result};

use sitepush_core::{config as file_config, DeployConfig};

/// File config (if any) layered over built-in defaults.
pub(crate) fn effective_config(explicit: Option<&Path>) -> Result<DeployConfig> {
    let (file, source) = file_config::resolve(explicit).context("failed to load config")?;
    if let Some(path) = &source {
        tracing::debug!(path = %path.display(), "loaded config");
    }
    Ok(file.or(DeployConfig::defaults()))
}
