//! Restrict a run to a named subset of groups.

use reaper_core::AutoScalingGroup;

/// Keep groups whose name matches one of `names`, ignoring case.
///
/// An empty `names` keeps every group. Input order is preserved and a
/// group is kept at most once however many names match it.
pub fn filter_groups(groups: Vec<AutoScalingGroup>, names: &[String]) -> Vec<AutoScalingGroup> {
    if names.is_empty() {
        return groups;
    }

    let wanted: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    groups
        .into_iter()
        .filter(|group| wanted.contains(&group.name.to_lowercase()))
        .collect()
}
