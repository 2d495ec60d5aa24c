use thiserror::Error;

/// Authentication failures. These are fatal for every probe that depends on
/// the session, so callers must halt rather than proceed without one.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider refused the credentials.
    #[error("authentication failed for '{tag}' ({email}): {message}")]
    Rejected {
        tag: String,
        email: String,
        message: String,
    },

    /// The identity has an empty email or password.
    #[error("identity '{0}' has no credentials configured")]
    MissingCredentials(String),

    /// Network-level failure reaching the auth endpoint.
    #[error("auth request failed: {0}")]
    Transport(String),

    /// The provider answered but the response was not a usable session.
    #[error("auth response missing {0}")]
    MalformedResponse(&'static str),
}

impl AuthError {
    /// Whether the provider itself turned the login down (as opposed to the
    /// request never completing). Used to pick remediation messaging for the
    /// pre-provisioned attacker account.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Transport and decode failures while issuing a query. Never fatal for a
/// run: the executor downgrades these to an INCONCLUSIVE verdict.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("failed to decode {context} response: {message}")]
    Decode {
        context: &'static str,
        message: String,
    },

    #[error("failed to build HTTP client: {0}")]
    Build(String),
}
