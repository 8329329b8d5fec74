//! Provider error types.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use reaper_core::VersionError;

/// Errors raised by a `CloudProvider`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed inventory: {0}")]
    InventoryFormat(#[from] serde_json::Error),

    #[error("inventory lists group {0:?} more than once")]
    DuplicateGroup(String),

    #[error("instance not found: {0}")]
    InstanceNotFound(String),

    #[error("instance {0} has no private address")]
    NoAddress(String),

    #[error("unsupported probe scheme {0:?}")]
    UnsupportedScheme(String),

    #[error("version probe of {url} failed: {reason}")]
    Probe { url: String, reason: String },

    #[error("version probe of {url} timed out after {timeout:?}")]
    ProbeTimeout { url: String, timeout: Duration },

    #[error("version probe of {url} returned HTTP {status}")]
    ProbeStatus { url: String, status: u16 },

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("termination request failed: {0}")]
    Terminate(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
