use thiserror::Error;

use sitepush_core::RepoCoordinates;

/// Why the token cannot be used for this deployment.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no access token supplied")]
    MissingToken,

    #[error("token rejected by host (401) for {repo}")]
    Unauthorized { repo: String },

    #[error("token lacks permission for {repo} (403)")]
    Forbidden { repo: String },

    /// The host answers 404 both for missing repos and for repos the token
    /// cannot see.
    #[error("repository {repo} not found or not visible to this token (404)")]
    NotFound { repo: String },

    #[error("token has read-only access to {repo}; push permission is required")]
    ReadOnly { repo: String },

    #[error("unexpected HTTP status {status} while checking access to {repo}")]
    UnexpectedStatus { repo: String, status: u16 },

    #[error("could not reach host: {0}")]
    Transport(String),

    #[error("malformed access-check response: {0}")]
    Decode(#[source] std::io::Error),
}

impl AuthError {
    pub(crate) fn from_status(repo: &RepoCoordinates, status: u16) -> Self {
        let repo = repo.to_string();
        match status {
            401 => AuthError::Unauthorized { repo },
            403 => AuthError::Forbidden { repo },
            404 => AuthError::NotFound { repo },
            status => AuthError::UnexpectedStatus { repo, status },
        }
    }
}
