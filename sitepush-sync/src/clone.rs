//! Shallow clone of the target repository into the workspace.

use sitepush_core::{AuthenticatedUrl, DeploymentRequest};

use crate::error::DeployError;
use crate::git::Git;
use crate::workspace::Workspace;

/// Checkout directory inside the workspace.
pub const CHECKOUT_DIR: &str = "repo";

/// Clone `request`'s repository (depth 1, every branch) into the workspace and
/// point `origin` at the credential-bearing URL.
///
/// The clone itself uses the plain URL; the credential is installed by a
/// separate, redacted `remote set-url` afterwards.
pub fn clone_repository(workspace: &Workspace, request: &DeploymentRequest) -> Result<Git, DeployError> {
    let url = request.clone_url();
    tracing::info!(%url, "cloning repository");

    let outer = Git::new(
        workspace.path(),
        request.identity.clone(),
        request.credential.clone(),
    );
    outer
        .run(&[
            "clone",
            "--quiet",
            "--depth",
            "1",
            "--no-single-branch",
            "--",
            &url,
            CHECKOUT_DIR,
        ])
        .map_err(DeployError::Clone)?;

    let git = outer.at(workspace.path().join(CHECKOUT_DIR));
    let authenticated = AuthenticatedUrl::embed(&url, &request.credential);
    if authenticated.carries_credential() {
        git.run_redacted(
            &["remote", "set-url", "origin", authenticated.expose()],
            "remote set-url origin <redacted>",
        )
        .map_err(DeployError::Clone)?;
        tracing::debug!("authenticated remote installed");
    }

    Ok(git)
}
