//! Identities under test and the sessions produced by authenticating them.

use serde::Serialize;

/// A named user identity with credentials.
///
/// Identities are injected from configuration and never mutated. The `tag`
/// names the identity's role in a scenario (e.g. `main`, `attacker`) and is
/// what appears in reports; the email only shows up in auth error messages.
#[derive(Clone, Serialize)]
pub struct Identity {
    pub tag: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
}

impl Identity {
    #[must_use]
    pub fn new(tag: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// An identity is usable only with both credential fields present.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

// Manual Debug so a dropped-in `{:?}` never leaks a password into logs.
impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("tag", &self.tag)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The result of authenticating an [`Identity`]: an access token scoped to
/// that user for the duration of one run. Never persisted.
#[derive(Clone, Serialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    #[serde(skip)]
    pub access_token: String,
}

impl Session {
    /// A session is live only with both a token and a user id.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.access_token.is_empty() && !self.user_id.is_empty()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
