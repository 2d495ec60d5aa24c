//! Probes and their observed outcomes.
//!
//! A [`Probe`] is one scripted attempt to perform an operation against a
//! protected table. The executor decodes whatever the backend returned into
//! an [`Observation`] exactly once; everything downstream (classifier,
//! reporter) consumes typed values, never raw responses or caught exceptions.

use serde::Serialize;
use serde_json::Value;

use crate::verdict::{AccessPolicy, Verdict};

/// The operation a probe performs against its target table.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProbeOp {
    /// Unfiltered read of the whole table.
    ReadAll,
    /// Filtered read for one known record.
    ReadById { column: String, value: String },
    /// Create one record; `fields` must carry the unique cleanup tag.
    Insert { fields: Value },
    /// Remove records matching the cleanup tag. Cleanup only.
    Delete { column: String, value: String },
}

/// One scripted probe: target table, operation, and the expected-access
/// policy its outcome is judged against. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Probe {
    /// Human-readable label for reports, e.g. `attacker read-all on clients`.
    pub label: String,
    pub table: String,
    /// Column holding the owning user's id in this table.
    pub owner_column: String,
    pub op: ProbeOp,
    pub policy: AccessPolicy,
}

impl Probe {
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        table: impl Into<String>,
        op: ProbeOp,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            label: label.into(),
            table: table.into(),
            owner_column: "user_id".into(),
            op,
            policy,
        }
    }

    /// Override the ownership column (e.g. `id` on the `users` table, where
    /// a row's primary key is the owning user).
    #[must_use]
    pub fn owner_column(mut self, column: impl Into<String>) -> Self {
        self.owner_column = column.into();
        self
    }
}

/// What actually came back from the backend, decoded once at the boundary.
///
/// Provider rejections (an RLS policy refusing a write) are explicit values
/// here, not errors: in fix-verification mode a rejection is frequently the
/// desired outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    /// A read completed. `foreign` counts rows owned by someone other than
    /// the probing identity (per the probe's owner column).
    Rows { total: usize, foreign: usize },
    /// An insert completed. `returned` is whether the backend echoed the
    /// created record; `id` its primary key; `owned_by_self` whether the
    /// echoed ownership field matches the probing identity (None when the
    /// record or field was not returned).
    Inserted {
        returned: bool,
        id: Option<String>,
        owned_by_self: Option<bool>,
    },
    /// The provider refused the operation (policy rejection, not transport).
    Rejected { reason: String },
    /// Transport or decode failure. Always classifies INCONCLUSIVE.
    Failed { message: String },
}

/// The record of one executed probe. Invariant: every `ProbeResult` comes
/// from a probe actually issued against a live scoped client; results are
/// never synthesized.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub probe: Probe,
    pub observation: Observation,
    pub verdict: Verdict,
}

impl ProbeResult {
    /// Classify an observation against the probe's policy.
    #[must_use]
    pub fn classify(probe: Probe, observation: Observation) -> Self {
        let verdict = crate::verdict::classify(&probe.policy, &observation);
        Self {
            probe,
            observation,
            verdict,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn probe_defaults_to_user_id_owner_column() {
        let probe = Probe::new(
            "read-all on clients",
            "clients",
            ProbeOp::ReadAll,
            AccessPolicy::SeeNoForeign,
        );
        assert_eq!(probe.owner_column, "user_id");
    }

    #[test]
    fn owner_column_override() {
        let probe = Probe::new(
            "read-all on users",
            "users",
            ProbeOp::ReadAll,
            AccessPolicy::SeeOnlySelf,
        )
        .owner_column("id");
        assert_eq!(probe.owner_column, "id");
    }

    #[test]
    fn classify_attaches_verdict() {
        let probe = Probe::new(
            "attacker read-by-id on clients",
            "clients",
            ProbeOp::ReadById {
                column: "id".into(),
                value: "c-1".into(),
            },
            AccessPolicy::SeeNone,
        );
        let result = ProbeResult::classify(probe, Observation::Rows { total: 0, foreign: 0 });
        assert_eq!(result.verdict, Verdict::Secure);
    }

    #[test]
    fn probe_serializes_with_op_kind() {
        let probe = Probe::new(
            "insert on clients",
            "clients",
            ProbeOp::Insert {
                fields: json!({"name": "x", "status": "Prospek"}),
            },
            AccessPolicy::WriteAllowed,
        );
        let value = serde_json::to_value(&probe).expect("probe should serialize");
        assert_eq!(value["op"]["kind"], "insert");
        assert_eq!(value["table"], "clients");
    }
}
