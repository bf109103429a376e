//! # sitepush-sync
//!
//! Publishes an artifact tree to a branch of a remote git repository.
//!
//! Call [`deploy`] with a [`DeploymentRequest`](sitepush_core::DeploymentRequest)
//! and an [`AccessCheck`](sitepush_auth::AccessCheck). The stages are public
//! so they can be driven one at a time.

pub mod branch;
pub mod clone;
pub mod commit;
pub mod content;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod publish;
pub mod workspace;

pub use content::SyncReport;
pub use error::DeployError;
pub use git::{Git, GitFailure};
pub use pipeline::{deploy, DeployOutcome};
pub use publish::PushMode;
pub use workspace::Workspace;
