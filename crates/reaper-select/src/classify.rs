//! Healthy/unhealthy partition of a group's instances.

use reaper_core::Instance;

/// Split instances into `(healthy, unhealthy)`.
///
/// Both outputs keep the relative order of the input.
pub fn classify(instances: &[Instance]) -> (Vec<&Instance>, Vec<&Instance>) {
    instances.iter().partition(|instance| instance.is_healthy())
}
