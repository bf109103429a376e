//! # sitepush-auth
//!
//! Pre-flight token validation. Runs before any workspace or clone exists, so
//! a failure here has no side effects.
//!
//! The pipeline depends on the [`AccessCheck`] trait; [`HttpTokenValidator`]
//! implements it against the hosting provider's REST API and
//! [`SkipAccessCheck`] is used for remotes without one.

mod error;

use std::time::Duration;

use serde::Deserialize;
use sitepush_core::{Credential, RepoCoordinates};

pub use error::AuthError;

const USER_AGENT: &str = concat!("sitepush/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What the host reported about the token's access to the repository.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessGrant {
    /// `owner/name` as the host spells it, when reported.
    pub full_name: Option<String>,
    /// `None` when the host did not report permissions.
    pub can_push: Option<bool>,
}

/// Confirms a credential can reach the target repository.
pub trait AccessCheck {
    fn check(
        &self,
        repo: &RepoCoordinates,
        credential: &Credential,
    ) -> Result<AccessGrant, AuthError>;
}

// ---------------------------------------------------------------------------
// HTTP validator
// ---------------------------------------------------------------------------

/// `GET {api_base}/repos/{owner}/{name}` with the token as a bearer header.
#[derive(Debug)]
pub struct HttpTokenValidator {
    agent: ureq::Agent,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    full_name: Option<String>,
    permissions: Option<RepoPermissions>,
}

#[derive(Debug, Deserialize)]
struct RepoPermissions {
    push: Option<bool>,
}

impl HttpTokenValidator {
    pub fn new(api_base: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, repo: &RepoCoordinates) -> String {
        format!("{}/repos/{}/{}", self.api_base, repo.owner, repo.name)
    }
}

impl AccessCheck for HttpTokenValidator {
    fn check(
        &self,
        repo: &RepoCoordinates,
        credential: &Credential,
    ) -> Result<AccessGrant, AuthError> {
        if credential.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let url = self.endpoint(repo);
        tracing::debug!(%url, "checking token access");

        let response = self
            .agent
            .get(&url)
            .set("Accept", "application/vnd.github+json")
            .set("Authorization", &format!("Bearer {}", credential.expose()))
            .call();

        let response = match response {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(AuthError::from_status(repo, status));
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(AuthError::Transport(credential.scrub(&transport.to_string())));
            }
        };

        let body: RepoResponse = response.into_json().map_err(AuthError::Decode)?;
        let grant = AccessGrant {
            full_name: body.full_name,
            can_push: body.permissions.and_then(|p| p.push),
        };

        if grant.can_push == Some(false) {
            return Err(AuthError::ReadOnly {
                repo: repo.to_string(),
            });
        }

        tracing::info!(repo = %repo, "token has access to repository");
        Ok(grant)
    }
}

// ---------------------------------------------------------------------------
// No-op validator
// ---------------------------------------------------------------------------

/// Accepts any credential. For local mirrors and hosts without an API.
#[derive(Debug, Default, Clone, Copy)]
pub struct SkipAccessCheck;

impl AccessCheck for SkipAccessCheck {
    fn check(
        &self,
        repo: &RepoCoordinates,
        _credential: &Credential,
    ) -> Result<AccessGrant, AuthError> {
        tracing::warn!(repo = %repo, "token access check skipped");
        Ok(AccessGrant::default())
    }
}
