//! Run loop error types.

use thiserror::Error;

use reaper_provider::ProviderError;

/// Failures the run loop absorbs. Each is logged and the run carries on
/// (or ends with an empty report when groups cannot be listed).
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to describe autoscaling groups: {0}")]
    Describe(#[source] ProviderError),

    #[error("failed to terminate instances in group {group}: {source}")]
    Terminate {
        group: String,
        #[source]
        source: ProviderError,
    },
}
