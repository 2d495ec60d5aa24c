//! The two policy tables.
//!
//! Discovery and fix verification are just two different probe sequences
//! feeding the same executor and classifier. Each insert probe's record name
//! carries the run's unique tag so the cleanup deletes are keyed to exactly
//! what this run created.

use serde::Serialize;
use serde_json::json;

use rowscan_core::{AccessPolicy, Probe, ProbeOp};

/// Which policy table a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    Discovery,
    VerifyFix,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discovery => write!(f, "vulnerability discovery"),
            Self::VerifyFix => write!(f, "fix verification"),
        }
    }
}

/// Table the scenarios create and delete records in.
pub const CLIENTS_TABLE: &str = "clients";

/// Status value the probed application expects on new client records.
const NEW_CLIENT_STATUS: &str = "Prospek";

/// Discovery reads: the authenticated main user sweeps the shared tables.
/// Any foreign row visible is the finding; the `users` table should show
/// exactly the user's own row.
pub fn discovery_read_probes() -> Vec<Probe> {
    vec![
        Probe::new(
            "main read-all on users",
            "users",
            ProbeOp::ReadAll,
            AccessPolicy::SeeOnlySelf,
        )
        .owner_column("id"),
        Probe::new(
            "main read-all on clients",
            CLIENTS_TABLE,
            ProbeOp::ReadAll,
            AccessPolicy::SeeNoForeign,
        ),
        Probe::new(
            "main read-all on projects",
            "projects",
            ProbeOp::ReadAll,
            AccessPolicy::SeeNoForeign,
        ),
    ]
}

/// Discovery write probe. In the unfixed application writes go through
/// unchecked, so a successful insert is the vulnerability.
pub fn discovery_insert_probe(record_name: &str) -> Probe {
    Probe::new(
        "main insert on clients",
        CLIENTS_TABLE,
        ProbeOp::Insert {
            fields: json!({ "name": record_name, "status": NEW_CLIENT_STATUS }),
        },
        AccessPolicy::WriteRejected,
    )
}

/// Fix verification step 1: the main user creates a record the attacker will
/// then try to reach. The ownership field is left to the server-side default.
pub fn main_insert_probe(record_name: &str) -> Probe {
    Probe::new(
        "main insert on clients",
        CLIENTS_TABLE,
        ProbeOp::Insert {
            fields: json!({ "name": record_name, "status": NEW_CLIENT_STATUS }),
        },
        AccessPolicy::WriteAllowed,
    )
}

/// Fix verification step 2: the attacker reads the main user's record by id.
pub fn attacker_read_by_id_probe(record_id: &str) -> Probe {
    Probe::new(
        "attacker read-by-id on clients",
        CLIENTS_TABLE,
        ProbeOp::ReadById {
            column: "id".into(),
            value: record_id.into(),
        },
        AccessPolicy::SeeNone,
    )
}

/// Fix verification step 3: a full table scan must contain no row owned by
/// anyone but the attacker.
pub fn attacker_read_all_probe() -> Probe {
    Probe::new(
        "attacker read-all on clients",
        CLIENTS_TABLE,
        ProbeOp::ReadAll,
        AccessPolicy::SeeNoForeign,
    )
}

/// Fix verification step 4: the attacker's own write must still work.
pub fn attacker_insert_probe(record_name: &str) -> Probe {
    Probe::new(
        "attacker insert own record on clients",
        CLIENTS_TABLE,
        ProbeOp::Insert {
            fields: json!({ "name": record_name, "status": NEW_CLIENT_STATUS }),
        },
        AccessPolicy::WriteAllowed,
    )
}

/// Fix verification step 5: an insert that spoofs the main user's ownership
/// field must be rejected, or the field overwritten server-side.
pub fn attacker_spoof_insert_probe(record_name: &str, main_user_id: &str) -> Probe {
    Probe::new(
        "attacker insert spoofing main user's ownership",
        CLIENTS_TABLE,
        ProbeOp::Insert {
            fields: json!({
                "name": record_name,
                "status": NEW_CLIENT_STATUS,
                "user_id": main_user_id,
            }),
        },
        AccessPolicy::SpoofRejected,
    )
}

/// Cleanup delete keyed on a tagged record name. Best effort only.
pub fn cleanup_probe(identity_tag: &str, record_name: &str) -> Probe {
    Probe::new(
        format!("{identity_tag} cleanup delete on clients"),
        CLIENTS_TABLE,
        ProbeOp::Delete {
            column: "name".into(),
            value: record_name.into(),
        },
        AccessPolicy::Cleanup,
    )
}
