//! Error types for loading selector configuration.

use cellselector_core::GridError;
use thiserror::Error;

/// Errors raised while loading or validating a [`crate::CellSelectorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML document could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// TOML document could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Parsed values are out of range.
    #[error("Validation error: {0}")]
    Invalid(#[from] GridError),
}
