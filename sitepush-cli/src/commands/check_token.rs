//! `sitepush check-token`: verify push access without deploying.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use sitepush_auth::{AccessCheck, HttpTokenValidator};
use sitepush_core::{Credential, RepoCoordinates};

use super::effective_config;

#[derive(Args, Debug)]
pub struct CheckTokenArgs {
    /// Target repository as `owner/name`.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: RepoCoordinates,

    /// Access token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// REST API base URL.
    #[arg(long)]
    pub api_base: Option<String>,
}

impl CheckTokenArgs {
    pub fn run(self, config: Option<&Path>) -> Result<()> {
        let config = effective_config(config)?;
        let api_base = self
            .api_base
            .unwrap_or_else(|| config.api_base().to_string());
        let credential = Credential::new(self.token.unwrap_or_default());

        let grant = HttpTokenValidator::new(api_base)
            .check(&self.repo, &credential)
            .with_context(|| format!("token check failed for {}", self.repo))?;

        let name = grant.full_name.unwrap_or_else(|| self.repo.to_string());
        println!("{} token can push to {}", "✓".green().bold(), name.bold());
        Ok(())
    }
}
