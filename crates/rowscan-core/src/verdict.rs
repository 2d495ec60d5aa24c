//! Expected-access policies and the verdict classifier.
//!
//! [`classify`] is the only decision logic in the system. It is a pure
//! function over one exhaustive policy table, so the discovery and
//! fix-verification run modes are just two different probe tables feeding
//! the same classifier.

use serde::Serialize;

use crate::probe::Observation;

/// What a probe's outcome is expected to look like when the backend's
/// row-level policies are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessPolicy {
    /// The identity should see zero records (e.g. another user's row by id).
    SeeNone,
    /// The identity should see exactly its own record and nothing else.
    SeeOnlySelf,
    /// Reads may return the identity's own rows but none owned by others.
    SeeNoForeign,
    /// A self-write should succeed and return the created record.
    WriteAllowed,
    /// The write should be refused by policy.
    WriteRejected,
    /// A write that spoofs another user's ownership field must be rejected
    /// outright or have the field overwritten server-side.
    SpoofRejected,
    /// Best-effort cleanup delete; never more severe than INCONCLUSIVE.
    Cleanup,
}

/// Classification of one observed outcome against its policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Verdict {
    ConfirmedVulnerable,
    Secure,
    Inconclusive,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfirmedVulnerable => write!(f, "CONFIRMED-VULNERABLE"),
            Self::Secure => write!(f, "SECURE"),
            Self::Inconclusive => write!(f, "INCONCLUSIVE"),
        }
    }
}

/// The policy table. Every (policy, observation) pair is decided here and
/// nowhere else.
///
/// Transport failures are always INCONCLUSIVE: we learned nothing about the
/// policy under test. A zero-row read under `SeeOnlySelf` is likewise
/// INCONCLUSIVE rather than silently secure: the identity's own row should
/// have been visible, so something else is wrong.
#[must_use]
pub fn classify(policy: &AccessPolicy, observation: &Observation) -> Verdict {
    use AccessPolicy as P;
    use Observation as O;
    use Verdict as V;

    match (policy, observation) {
        (_, O::Failed { .. }) => V::Inconclusive,

        (P::SeeNone, O::Rows { total: 0, .. }) => V::Secure,
        (P::SeeNone, O::Rows { .. }) => V::ConfirmedVulnerable,

        (P::SeeOnlySelf, O::Rows { total: 1, .. }) => V::Secure,
        (P::SeeOnlySelf, O::Rows { total: 0, .. }) => V::Inconclusive,
        (P::SeeOnlySelf, O::Rows { .. }) => V::ConfirmedVulnerable,

        (P::SeeNoForeign, O::Rows { foreign: 0, .. }) => V::Secure,
        (P::SeeNoForeign, O::Rows { .. }) => V::ConfirmedVulnerable,

        // Reads refused by policy reveal nothing further to this identity.
        (P::SeeNone | P::SeeOnlySelf | P::SeeNoForeign, O::Rejected { .. }) => V::Secure,

        (P::WriteAllowed, O::Inserted { returned: true, .. }) => V::Secure,
        (P::WriteAllowed, O::Inserted { returned: false, .. }) => V::Inconclusive,
        (P::WriteAllowed, O::Rejected { .. }) => V::ConfirmedVulnerable,

        (P::WriteRejected, O::Rejected { .. }) => V::Secure,
        (P::WriteRejected, O::Inserted { .. }) => V::ConfirmedVulnerable,

        (P::SpoofRejected, O::Rejected { .. }) => V::Secure,
        (
            P::SpoofRejected,
            O::Inserted {
                owned_by_self: Some(owned),
                ..
            },
        ) => {
            if *owned {
                V::Secure
            } else {
                V::ConfirmedVulnerable
            }
        }
        (P::SpoofRejected, O::Inserted { owned_by_self: None, .. }) => V::Inconclusive,

        (P::Cleanup, _) => V::Secure,

        // Operation/policy mismatches (e.g. rows observed for a write
        // policy) mean the probe table is wrong; flag, never pass.
        _ => V::Inconclusive,
    }
}
