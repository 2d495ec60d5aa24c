//! # rowscan-config
//!
//! Layered configuration loading for rowscan using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ROWSCAN_*` prefix, `__` as separator)
//! 2. Project-level `.rowscan/config.toml`
//! 3. User-level `~/.config/rowscan/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `ROWSCAN_SUPABASE__URL` -> `supabase.url`,
//! `ROWSCAN_IDENTITIES__ATTACKER__EMAIL` -> `identities.attacker.email`,
//! etc. The `__` (double underscore) separates nested config sections.

mod error;
mod identities;
mod probe;
mod supabase;

pub use error::ConfigError;
pub use identities::{IdentitiesConfig, IdentityConfig};
pub use probe::ProbeConfig;
pub use supabase::SupabaseConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RowscanConfig {
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub identities: IdentitiesConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl RowscanConfig {
    /// Load configuration from all sources (TOML files + environment).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env`
    /// file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if extraction fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support. The typical entry point
    /// for the CLI.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if extraction fails.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load()
    }

    /// Build the figment provider chain. Public so tests can layer extra
    /// providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".rowscan/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("ROWSCAN_").split("__"))
    }

    /// Fail unless the backend section is complete. A missing URL or key is
    /// fatal: the run reports it and exits non-zero before any probe.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when either field is missing.
    pub fn require_supabase(&self) -> Result<(), ConfigError> {
        if self.supabase.is_configured() {
            Ok(())
        } else {
            Err(ConfigError::NotConfigured {
                section: "supabase".into(),
                remedy: "set ROWSCAN_SUPABASE__URL and ROWSCAN_SUPABASE__ANON_KEY",
            })
        }
    }

    /// Fail unless the main identity has credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when credentials are missing.
    pub fn require_main_identity(&self) -> Result<(), ConfigError> {
        if self.identities.main.is_configured() {
            Ok(())
        } else {
            Err(ConfigError::NotConfigured {
                section: "identities.main".into(),
                remedy: "set ROWSCAN_IDENTITIES__MAIN__EMAIL and ROWSCAN_IDENTITIES__MAIN__PASSWORD",
            })
        }
    }

    /// Fail unless the attacker identity has credentials. Only required for
    /// fix-verification runs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when credentials are missing.
    pub fn require_attacker_identity(&self) -> Result<(), ConfigError> {
        if self.identities.attacker.is_configured() {
            Ok(())
        } else {
            Err(ConfigError::NotConfigured {
                section: "identities.attacker".into(),
                remedy: "pre-provision a second account in the project, then set \
                         ROWSCAN_IDENTITIES__ATTACKER__EMAIL and ROWSCAN_IDENTITIES__ATTACKER__PASSWORD",
            })
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rowscan").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_unconfigured() {
        let config = RowscanConfig::default();
        assert!(!config.supabase.is_configured());
        assert!(config.require_supabase().is_err());
        assert!(config.require_main_identity().is_err());
        assert!(config.require_attacker_identity().is_err());
        assert_eq!(config.probe.timeout_secs, 30);
    }

    #[test]
    fn env_vars_map_into_nested_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ROWSCAN_SUPABASE__URL", "https://abcdefgh.supabase.co");
            jail.set_env("ROWSCAN_SUPABASE__ANON_KEY", "anon-key");
            jail.set_env("ROWSCAN_IDENTITIES__MAIN__EMAIL", "main@example.com");
            jail.set_env("ROWSCAN_IDENTITIES__MAIN__PASSWORD", "pw");
            jail.set_env("ROWSCAN_PROBE__TIMEOUT_SECS", "5");

            let config: RowscanConfig = RowscanConfig::figment().extract()?;
            assert_eq!(config.supabase.url, "https://abcdefgh.supabase.co");
            assert!(config.require_supabase().is_ok());
            assert!(config.require_main_identity().is_ok());
            assert!(config.require_attacker_identity().is_err());
            assert_eq!(config.probe.timeout_secs, 5);
            Ok(())
        });
    }

    #[test]
    fn project_toml_layers_under_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_dir(".rowscan")?;
            jail.create_file(
                ".rowscan/config.toml",
                r#"
                [supabase]
                url = "https://from-toml.supabase.co"
                anon_key = "toml-key"

                [probe]
                timeout_secs = 10
                "#,
            )?;
            jail.set_env("ROWSCAN_SUPABASE__ANON_KEY", "env-key");

            let config: RowscanConfig = RowscanConfig::figment().extract()?;
            assert_eq!(config.supabase.url, "https://from-toml.supabase.co");
            assert_eq!(config.supabase.anon_key, "env-key");
            assert_eq!(config.probe.timeout_secs, 10);
            Ok(())
        });
    }

    #[test]
    fn missing_sections_name_their_remedy() {
        let err = RowscanConfig::default()
            .require_attacker_identity()
            .expect_err("unconfigured attacker should fail");
        let message = err.to_string();
        assert!(message.contains("identities.attacker"));
        assert!(message.contains("ROWSCAN_IDENTITIES__ATTACKER__EMAIL"));
    }
}
