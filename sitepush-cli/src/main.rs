//! sitepush: publish a built site to a git branch.
//!
//! # Usage
//!
//! ```text
//! sitepush deploy <DIR> --repo owner/name --revision <rev> [--branch gh-pages] [--json]
//! sitepush check-token --repo owner/name
//! sitepush config show|init
//! ```
//!
//! The token is read from `--token` or `GITHUB_TOKEN`; repository and revision
//! fall back to `GITHUB_REPOSITORY` and `GITHUB_SHA`.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check_token::CheckTokenArgs, config::ConfigCommand, deploy::DeployArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "sitepush",
    version,
    about = "Publish a built artifact tree to a branch of a git repository",
    long_about = None,
)]
struct Cli {
    /// Config file to use instead of ./sitepush.yaml or the user config.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synchronize a directory onto the target branch and push it.
    Deploy(DeployArgs),

    /// Verify that a token can push to a repository.
    CheckToken(CheckTokenArgs),

    /// Inspect or create the config file.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Deploy(args) => args.run(config),
        Commands::CheckToken(args) => args.run(config).map(|()| ExitCode::SUCCESS),
        Commands::Config { command } => {
            commands::config::run(command, config).map(|()| ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
