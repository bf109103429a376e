//! Shared domain types, secrets, configuration and errors for sitepush.
//!
//! - [`types`]: newtypes, [`DeploymentRequest`], [`BranchState`]
//! - [`secret`]: [`Credential`] and [`AuthenticatedUrl`]
//! - [`config`]: YAML config discovery / load / create
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod secret;
pub mod types;

pub use config::DeployConfig;
pub use error::ConfigError;
pub use secret::{AuthenticatedUrl, Credential};
pub use types::{
    BranchName, BranchState, CommitIdentity, CommitTemplate, DeploymentRequest, RepoCoordinates,
    Revision, SyncOptions,
};
