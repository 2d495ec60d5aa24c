//! Scoped PostgREST query client.
//!
//! A [`ScopedClient`] is the query-issuing capability bound to exactly one
//! authenticated session: every request carries the project's anonymous key
//! plus that session's bearer token, so the backend applies the session
//! user's row-level policies. The [`QueryApi`] trait is the seam the probe
//! executor is written against, so it can be exercised with a stub.

use std::time::Duration;

use serde_json::Value;

use rowscan_core::Session;

use crate::error::ClientError;
use crate::record::{ApiRejection, QueryReply, Record};

/// The query surface a probe executor needs. Implemented by [`ScopedClient`]
/// for real runs and by stubs in executor tests.
#[allow(async_fn_in_trait)]
pub trait QueryApi {
    /// The authenticated user this capability is scoped to.
    fn user_id(&self) -> &str;

    /// Unfiltered read: `GET /rest/v1/{table}?select=*`.
    async fn select_all(&self, table: &str) -> Result<QueryReply, ClientError>;

    /// Filtered read: `GET /rest/v1/{table}?select=*&{column}=eq.{value}`.
    async fn select_eq(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<QueryReply, ClientError>;

    /// Create one record, asking for the representation back.
    async fn insert(&self, table: &str, fields: &Value) -> Result<QueryReply, ClientError>;

    /// Delete records matching the filter, returning what was removed.
    async fn delete_eq(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<QueryReply, ClientError>;
}

/// PostgREST client bound to one session.
#[derive(Debug)]
pub struct ScopedClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: Session,
}

impl ScopedClient {
    /// Bind a query client to an authenticated session, with a per-call
    /// timeout so a hung backend cannot hang the run.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        anon_key: &str,
        session: Session,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.session.access_token)
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        context: &'static str,
    ) -> Result<QueryReply, ClientError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Ok(QueryReply::Rejected(ApiRejection::from_body(
                status.as_u16(),
                &body,
            )));
        }

        decode_rows(&body, context)
    }
}

/// Decode a successful PostgREST body into rows. Reads and representation
/// writes return a JSON array; deletes without matches return `[]` or an
/// empty body.
fn decode_rows(body: &str, context: &'static str) -> Result<QueryReply, ClientError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(QueryReply::Rows(Vec::new()));
    }

    // Single-object representations show up on upserts with limited prefs.
    if trimmed.starts_with('{') {
        let row: Record = serde_json::from_str(trimmed).map_err(|e| ClientError::Decode {
            context,
            message: e.to_string(),
        })?;
        return Ok(QueryReply::Rows(vec![row]));
    }

    let rows: Vec<Record> = serde_json::from_str(trimmed).map_err(|e| ClientError::Decode {
        context,
        message: e.to_string(),
    })?;
    Ok(QueryReply::Rows(rows))
}

impl QueryApi for ScopedClient {
    fn user_id(&self) -> &str {
        &self.session.user_id
    }

    async fn select_all(&self, table: &str) -> Result<QueryReply, ClientError> {
        tracing::debug!(table, user_id = %self.user_id(), "select_all");
        let builder = self
            .authed(self.http.get(self.table_url(table)))
            .query(&[("select", "*")]);
        self.send(builder, "select").await
    }

    async fn select_eq(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<QueryReply, ClientError> {
        tracing::debug!(table, column, value, user_id = %self.user_id(), "select_eq");
        let builder = self
            .authed(self.http.get(self.table_url(table)))
            .query(&[("select", "*"), (column, &format!("eq.{value}"))]);
        self.send(builder, "select").await
    }

    async fn insert(&self, table: &str, fields: &Value) -> Result<QueryReply, ClientError> {
        tracing::debug!(table, user_id = %self.user_id(), "insert");
        let builder = self
            .authed(self.http.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(fields);
        self.send(builder, "insert").await
    }

    async fn delete_eq(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<QueryReply, ClientError> {
        tracing::debug!(table, column, value, user_id = %self.user_id(), "delete_eq");
        let builder = self
            .authed(self.http.delete(self.table_url(table)))
            .header("Prefer", "return=representation")
            .query(&[(column, &format!("eq.{value}"))]);
        self.send(builder, "delete").await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn session() -> Session {
        Session {
            user_id: "u-main".into(),
            email: "main@example.com".into(),
            access_token: "tok".into(),
        }
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ScopedClient::new(
            "https://project.supabase.co/",
            "anon",
            session(),
            Duration::from_secs(5),
        )
        .expect("client should build");
        assert_eq!(
            client.table_url("clients"),
            "https://project.supabase.co/rest/v1/clients"
        );
    }

    #[test]
    fn scoped_client_reports_its_user() {
        let client = ScopedClient::new(
            "https://project.supabase.co",
            "anon",
            session(),
            Duration::from_secs(5),
        )
        .expect("client should build");
        assert_eq!(client.user_id(), "u-main");
    }

    #[test]
    fn decode_rows_handles_array_object_and_empty_bodies() {
        let QueryReply::Rows(rows) =
            decode_rows(r#"[{"id": "c-1"}, {"id": "c-2"}]"#, "select").expect("array decodes")
        else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 2);

        let QueryReply::Rows(rows) =
            decode_rows(r#"{"id": "c-1"}"#, "insert").expect("object decodes")
        else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id().as_deref(), Some("c-1"));

        let QueryReply::Rows(rows) = decode_rows("", "delete").expect("empty body decodes") else {
            panic!("expected rows");
        };
        assert!(rows.is_empty());
    }

    #[test]
    fn decode_rows_flags_malformed_bodies() {
        let err = decode_rows("[{broken", "select").expect_err("malformed body should fail");
        assert!(matches!(err, ClientError::Decode { context: "select", .. }));
    }
}
