//! Typed error variants for the meshterm-config crate.
//!
//! `Config::load` and `Config::save` still return `anyhow::Result`; callers
//! that care about the failure mode can downcast to [`ConfigError`].

use thiserror::Error;

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML could not be parsed into a [`crate::Config`].
    #[error("config parse error: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A value was syntactically valid but semantically rejected.
    #[error("invalid config: {0}")]
    Validation(String),
}
