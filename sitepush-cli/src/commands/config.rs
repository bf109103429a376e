//! `sitepush config`: show the effective config or write a starter file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use sitepush_core::{config as file_config, DeployConfig};

use super::effective_config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as YAML.
    Show,

    /// Write a config file with every default spelled out.
    Init,
}

pub fn run(command: ConfigCommand, explicit: Option<&Path>) -> Result<()> {
    match command {
        ConfigCommand::Show => show(explicit),
        ConfigCommand::Init => init(explicit),
    }
}

fn show(explicit: Option<&Path>) -> Result<()> {
    let config = effective_config(explicit)?;
    let yaml = serde_yaml::to_string(&config).context("failed to render config")?;
    print!("{yaml}");
    Ok(())
}

fn init(explicit: Option<&Path>) -> Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(file_config::LOCAL_CONFIG_FILE));
    file_config::create_at(&path, &DeployConfig::defaults())
        .with_context(|| format!("failed to create {}", path.display()))?;
    println!("{} wrote {}", "✓".green().bold(), path.display());
    Ok(())
}
