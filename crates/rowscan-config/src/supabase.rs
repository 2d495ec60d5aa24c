//! Backing database service configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SupabaseConfig {
    /// Project base URL (e.g. `https://abcdefgh.supabase.co`).
    #[serde(default)]
    pub url: String,

    /// Anonymous (publishable) API key. Sent on every request; row access
    /// is governed by the per-session bearer token, not this key.
    #[serde(default)]
    pub anon_key: String,
}

impl SupabaseConfig {
    /// Both fields are required; there is no probing without a backend.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.anon_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        assert!(!SupabaseConfig::default().is_configured());
    }

    #[test]
    fn requires_both_url_and_key() {
        let url_only = SupabaseConfig {
            url: "https://abcdefgh.supabase.co".into(),
            anon_key: String::new(),
        };
        assert!(!url_only.is_configured());

        let both = SupabaseConfig {
            url: "https://abcdefgh.supabase.co".into(),
            anon_key: "anon-key".into(),
        };
        assert!(both.is_configured());
    }
}
