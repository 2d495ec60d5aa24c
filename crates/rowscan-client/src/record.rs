//! Typed views over what the backend returns.
//!
//! PostgREST and the auth endpoint answer with loosely-shaped JSON; this
//! module decodes those bodies exactly once into [`Record`] rows and
//! [`ApiRejection`] refusals, so the executor and classifier only ever see
//! typed values.

use serde::Deserialize;
use serde_json::{Map, Value};

/// One row from a table read or write, as a decoded JSON object.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// The row's primary key, if the backend returned one.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        match self.0.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            // Integer primary keys appear on tables without UUID ids.
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        }
    }

    /// A string field by name.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Whether the row's `owner_column` names the given user.
    ///
    /// Returns `None` when the column is absent or not a string, so callers
    /// can distinguish "owned by someone else" from "ownership unknown".
    #[must_use]
    pub fn owned_by(&self, owner_column: &str, user_id: &str) -> Option<bool> {
        self.get_str(owner_column).map(|owner| owner == user_id)
    }
}

/// The provider refused an operation. Decoded from the error body; distinct
/// from a transport failure, because a refusal is frequently the outcome a
/// policy probe hopes for.
#[derive(Debug, Clone)]
pub struct ApiRejection {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
}

impl ApiRejection {
    /// Decode a non-2xx body. The auth endpoint uses
    /// `{error, error_description}` or `{code, msg}`; PostgREST uses
    /// `{code, message, details, hint}`. Unparseable bodies are kept
    /// verbatim so the report still shows what the server said.
    #[must_use]
    pub fn from_body(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let message = field("message")
            .or_else(|| field("msg"))
            .or_else(|| field("error_description"))
            .or_else(|| field("error"))
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("HTTP {status} with empty body")
                } else {
                    trimmed.to_string()
                }
            });

        let code = field("code").or_else(|| {
            parsed
                .as_ref()
                .and_then(|v| v.get("code"))
                .and_then(Value::as_i64)
                .map(|c| c.to_string())
        });

        Self {
            status,
            code,
            message,
        }
    }
}

impl std::fmt::Display for ApiRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} (code {code}, HTTP {})", self.message, self.status),
            None => write!(f, "{} (HTTP {})", self.message, self.status),
        }
    }
}

/// Outcome of one query call: rows, or a provider refusal.
#[derive(Debug)]
pub enum QueryReply {
    Rows(Vec<Record>),
    Rejected(ApiRejection),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn record(json: &str) -> Record {
        serde_json::from_str(json).expect("record fixture should parse")
    }

    #[test]
    fn record_id_handles_uuid_and_integer_keys() {
        let uuid = record(r#"{"id": "9b2f7c1e-0001-4c6e-8f3a-111111111111", "name": "x"}"#);
        assert_eq!(
            uuid.id().as_deref(),
            Some("9b2f7c1e-0001-4c6e-8f3a-111111111111")
        );

        let numeric = record(r#"{"id": 42}"#);
        assert_eq!(numeric.id().as_deref(), Some("42"));

        let missing = record(r#"{"name": "x"}"#);
        assert_eq!(missing.id(), None);
    }

    #[test]
    fn ownership_distinguishes_unknown_from_foreign() {
        let row = record(r#"{"id": "c-1", "user_id": "u-main"}"#);
        assert_eq!(row.owned_by("user_id", "u-main"), Some(true));
        assert_eq!(row.owned_by("user_id", "u-attacker"), Some(false));
        assert_eq!(row.owned_by("owner", "u-main"), None);
    }

    #[rstest]
    #[case(
        r#"{"code": "42501", "message": "new row violates row-level security policy for table \"clients\""}"#,
        403,
        Some("42501"),
        "new row violates row-level security policy for table \"clients\""
    )]
    #[case(
        r#"{"error": "invalid_grant", "error_description": "Invalid login credentials"}"#,
        400,
        None,
        "Invalid login credentials"
    )]
    #[case(r#"{"code": 400, "msg": "Invalid login credentials"}"#, 400, Some("400"), "Invalid login credentials")]
    fn rejection_decodes_known_error_shapes(
        #[case] body: &str,
        #[case] status: u16,
        #[case] code: Option<&str>,
        #[case] message: &str,
    ) {
        let rejection = ApiRejection::from_body(status, body);
        assert_eq!(rejection.status, status);
        assert_eq!(rejection.code.as_deref(), code);
        assert_eq!(rejection.message, message);
    }

    #[test]
    fn rejection_keeps_unparseable_body_verbatim() {
        let rejection = ApiRejection::from_body(502, "<html>bad gateway</html>");
        assert_eq!(rejection.message, "<html>bad gateway</html>");
        assert_eq!(rejection.code, None);
    }

    #[test]
    fn rejection_names_empty_bodies() {
        let rejection = ApiRejection::from_body(401, "  ");
        assert_eq!(rejection.message, "HTTP 401 with empty body");
        assert_eq!(rejection.to_string(), "HTTP 401 with empty body (HTTP 401)");
    }
}
