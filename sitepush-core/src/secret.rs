//! Secret-bearing values: the bearer token and URLs built from it.
//!
//! Neither type exposes its contents through `Debug` or `Display`; reading the
//! raw value requires an explicit `expose()` call at the single point of use.

use std::fmt;

const REDACTED: &str = "<redacted>";

/// Opaque bearer token with write access to the target repository.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace every occurrence of the raw token in `text`.
    ///
    /// Used on subprocess output before it is embedded in an error or log line.
    pub fn scrub(&self, text: &str) -> String {
        if self.0.is_empty() {
            return text.to_string();
        }
        text.replace(&self.0, "***")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({REDACTED})")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// Remote URL with the credential embedded as `x-access-token:<token>@host`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthenticatedUrl(String);

impl AuthenticatedUrl {
    /// Inject `credential` into an `http(s)` URL, replacing any existing
    /// userinfo. Other schemes (`file://`, plain paths) have no credential slot
    /// and are returned unchanged.
    pub fn embed(url: &str, credential: &Credential) -> Self {
        if credential.is_empty() {
            return Self(url.to_string());
        }
        for scheme in ["https://", "http://"] {
            if let Some(rest) = url.strip_prefix(scheme) {
                let host_end = rest.find('/').unwrap_or(rest.len());
                let rest = match rest[..host_end].rfind('@') {
                    Some(at) => &rest[at + 1..],
                    None => rest,
                };
                return Self(format!(
                    "{scheme}x-access-token:{}@{rest}",
                    credential.expose()
                ));
            }
        }
        Self(url.to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether a credential was actually embedded.
    pub fn carries_credential(&self) -> bool {
        self.0.contains("x-access-token:")
    }
}

impl fmt::Debug for AuthenticatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthenticatedUrl({REDACTED})")
    }
}

impl fmt::Display for AuthenticatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
