//! Test identity configuration.
//!
//! Credentials are injected here and nowhere else, never as literals in code.
//! Both accounts must be pre-provisioned in the backend project; the
//! attacker account is only required for fix-verification runs.

use serde::{Deserialize, Serialize};

use rowscan_core::Identity;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IdentitiesConfig {
    /// The account whose data the scenarios create and protect.
    #[serde(default)]
    pub main: IdentityConfig,

    /// A second account used to probe cross-user access.
    #[serde(default)]
    pub attacker: IdentityConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl IdentityConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }

    /// Materialize as a domain identity under the given role tag.
    #[must_use]
    pub fn to_identity(&self, tag: &str) -> Identity {
        Identity::new(tag, self.email.clone(), self.password.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_identities_are_unconfigured() {
        let config = IdentitiesConfig::default();
        assert!(!config.main.is_configured());
        assert!(!config.attacker.is_configured());
    }

    #[test]
    fn identity_materializes_with_tag() {
        let config = IdentityConfig {
            email: "main@example.com".into(),
            password: "pw".into(),
        };
        let identity = config.to_identity("main");
        assert_eq!(identity.tag, "main");
        assert_eq!(identity.email, "main@example.com");
        assert!(identity.has_credentials());
    }

    #[test]
    fn passwords_never_serialize() {
        let config = IdentityConfig {
            email: "main@example.com".into(),
            password: "pw".into(),
        };
        let json = serde_json::to_string(&config).expect("config should serialize");
        assert!(!json.contains("pw"));
    }
}
