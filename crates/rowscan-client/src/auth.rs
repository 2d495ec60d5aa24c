//! Password-grant authentication against the backend's auth endpoint.
//!
//! `POST {base_url}/auth/v1/token?grant_type=password` with the project's
//! anonymous API key; a successful response carries the access token and the
//! authenticated user, which become a [`Session`].

use std::time::Duration;

use serde::Deserialize;

use rowscan_core::{Identity, Session};

use crate::error::{AuthError, ClientError};
use crate::record::ApiRejection;

/// Client for the auth endpoint. One instance serves every identity in a
/// run; the scoped per-identity capability is the session it returns.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: String,
}

impl AuthClient {
    /// Build an auth client with a per-call timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    /// Authenticate one identity and return its session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] on refused credentials, transport failure, or a
    /// response without a usable token/user id. Callers must halt dependent
    /// probes on error; there is no null session.
    pub async fn authenticate(&self, identity: &Identity) -> Result<Session, AuthError> {
        if !identity.has_credentials() {
            return Err(AuthError::MissingCredentials(identity.tag.clone()));
        }

        tracing::debug!(tag = %identity.tag, email = %identity.email, "authenticating");

        let response = self
            .http
            .post(format!(
                "{}/auth/v1/token?grant_type=password",
                self.base_url
            ))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": identity.email,
                "password": identity.password,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !status.is_success() {
            let rejection = ApiRejection::from_body(status.as_u16(), &body);
            return Err(AuthError::Rejected {
                tag: identity.tag.clone(),
                email: identity.email.clone(),
                message: rejection.to_string(),
            });
        }

        let session = parse_token_response(&body)?;
        tracing::info!(tag = %identity.tag, user_id = %session.user_id, "authenticated");
        Ok(session)
    }
}

/// Decode a successful token response into a session, insisting on a
/// non-empty token and user id.
fn parse_token_response(body: &str) -> Result<Session, AuthError> {
    let token: TokenResponse =
        serde_json::from_str(body).map_err(|_| AuthError::MalformedResponse("token payload"))?;

    if token.access_token.is_empty() {
        return Err(AuthError::MalformedResponse("access token"));
    }
    if token.user.id.is_empty() {
        return Err(AuthError::MalformedResponse("user id"));
    }

    Ok(Session {
        user_id: token.user.id,
        email: token.user.email,
        access_token: token.access_token,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const TOKEN_FIXTURE: &str = r#"{
        "access_token": "eyJhbGciOiJIUzI1NiJ9.probe.sig",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh",
        "user": {
            "id": "9b2f7c1e-0001-4c6e-8f3a-111111111111",
            "email": "main@example.com",
            "role": "authenticated"
        }
    }"#;

    #[test]
    fn token_response_becomes_session() {
        let session = parse_token_response(TOKEN_FIXTURE).expect("fixture should parse");
        assert_eq!(session.user_id, "9b2f7c1e-0001-4c6e-8f3a-111111111111");
        assert_eq!(session.email, "main@example.com");
        assert!(session.is_live());
    }

    #[test]
    fn empty_token_is_rejected() {
        let body = r#"{"access_token": "", "user": {"id": "u-1"}}"#;
        let err = parse_token_response(body).expect_err("empty token should fail");
        assert!(err.to_string().contains("access token"));
    }

    #[test]
    fn missing_user_id_is_rejected() {
        let body = r#"{"access_token": "tok", "user": {"id": ""}}"#;
        let err = parse_token_response(body).expect_err("empty user id should fail");
        assert!(err.to_string().contains("user id"));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_token_response("<html></html>").expect_err("html should fail");
        assert!(matches!(err, AuthError::MalformedResponse("token payload")));
    }

    #[tokio::test]
    async fn identity_without_credentials_never_hits_the_network() {
        let client = AuthClient::new(
            "https://project.supabase.co",
            "anon-key",
            Duration::from_secs(5),
        )
        .expect("client should build");
        let identity = Identity::new("attacker", "", "");
        let err = client
            .authenticate(&identity)
            .await
            .expect_err("missing credentials should fail fast");
        assert!(matches!(err, AuthError::MissingCredentials(tag) if tag == "attacker"));
    }
}
