//! Error types for configuration and version parsing.

use thiserror::Error;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A version string that could not be understood.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed version {input:?}: {reason}")]
pub struct VersionError {
    pub input: String,
    pub reason: String,
}

/// Errors raised while loading or validating `reaper.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("unsupported probe scheme {0:?} (only http is supported)")]
    UnsupportedScheme(String),

    #[error("invalid canonical version: {0}")]
    CanonicalVersion(#[from] VersionError),
}
