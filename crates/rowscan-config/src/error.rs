//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A required configuration section is missing required fields.
    #[error("Configuration section '{section}' is not configured: {remedy}")]
    NotConfigured {
        section: String,
        remedy: &'static str,
    },
}
