//! Attach version details to instances.

use std::collections::HashMap;

use reaper_core::{Instance, InstanceVersionDetail};

/// Look up a version detail for every instance.
///
/// Instances for which `lookup` returns `None` are left out, so a result
/// shorter than `instances` means the version picture is incomplete. The
/// result is in retirement order (version, then launch time).
pub fn join<F>(instances: &[Instance], mut lookup: F) -> Vec<InstanceVersionDetail>
where
    F: FnMut(&Instance) -> Option<InstanceVersionDetail>,
{
    let mut details: Vec<InstanceVersionDetail> =
        instances.iter().filter_map(|instance| lookup(instance)).collect();
    sort_details(&mut details);
    details
}

/// Stable sort into retirement order.
pub fn sort_details(details: &mut [InstanceVersionDetail]) {
    details.sort_by(InstanceVersionDetail::retirement_order);
}

/// Index details by instance id. The first entry wins for repeated ids.
pub(crate) fn index_by_id(details: &[InstanceVersionDetail]) -> HashMap<&str, &InstanceVersionDetail> {
    let mut index = HashMap::with_capacity(details.len());
    for detail in details {
        index.entry(detail.id.as_str()).or_insert(detail);
    }
    index
}
