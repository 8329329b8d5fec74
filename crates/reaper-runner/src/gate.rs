//! Dry-run gate in front of the termination call.

use std::future::Future;

use tracing::{info, warn};

use reaper_core::InstanceId;
use reaper_provider::ProviderResult;

use crate::error::RunError;

/// Terminate `targets` unless this is a dry run.
///
/// Returns the ids that were actually terminated: empty on a dry run
/// (without calling `terminate`), empty when `terminate` fails, and
/// `targets` otherwise.
pub async fn apply<'a, F, Fut>(
    group: &str,
    targets: &'a [InstanceId],
    dry_run: bool,
    terminate: F,
) -> Vec<InstanceId>
where
    F: FnOnce(&'a [InstanceId]) -> Fut,
    Fut: Future<Output = ProviderResult<()>>,
{
    if targets.is_empty() {
        return Vec::new();
    }

    if dry_run {
        info!(
            group = %group,
            count = targets.len(),
            "dry run, no action taken; set dry_run = false to execute"
        );
        return Vec::new();
    }

    match terminate(targets).await {
        Ok(()) => {
            info!(group = %group, count = targets.len(), "termination complete");
            targets.to_vec()
        }
        Err(source) => {
            let e = RunError::Terminate {
                group: group.to_string(),
                source,
            };
            warn!(group = %group, error = %e, "termination failed");
            Vec::new()
        }
    }
}
