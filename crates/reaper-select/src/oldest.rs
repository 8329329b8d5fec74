//! Oldest-first selection of instances behind the newest observed version.

use serde::Serialize;

use reaper_core::{InstanceVersionDetail, SemanticVersion};

use crate::join::sort_details;

/// Result of [`select_oldest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OldestSelection {
    /// Lowest version observed (`0.0.0` when nothing was observed).
    pub lowest: SemanticVersion,
    /// Highest version observed (`0.0.0` when nothing was observed).
    pub highest: SemanticVersion,
    /// Instances below `highest`, oldest first, at most `cap` of them.
    pub selected: Vec<InstanceVersionDetail>,
}

/// Pick up to `cap` instances running something older than the newest
/// version in `details`, lowest version and longest-running first.
pub fn select_oldest(details: &[InstanceVersionDetail], cap: usize) -> OldestSelection {
    let highest = details
        .iter()
        .map(|d| &d.version)
        .max()
        .cloned()
        .unwrap_or_default();
    let lowest = details
        .iter()
        .map(|d| &d.version)
        .min()
        .cloned()
        .unwrap_or_default();

    let mut old: Vec<InstanceVersionDetail> = details
        .iter()
        .filter(|d| d.version < highest)
        .cloned()
        .collect();
    sort_details(&mut old);
    old.truncate(cap);

    OldestSelection {
        lowest,
        highest,
        selected: old,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(id: &str, version: &str, launch_time: u64) -> InstanceVersionDetail {
        InstanceVersionDetail::new(id, SemanticVersion::parse(version).unwrap(), launch_time)
    }

    fn ids(selection: &OldestSelection) -> Vec<&str> {
        selection.selected.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn picks_oldest_launch_among_old_versions() {
        let t0 = 100_000;
        let details = vec![
            detail("B", "1.0.0", t0 - 3600),
            detail("A", "1.0.0", t0),
            detail("C", "1.1.0", t0),
        ];

        let selection = select_oldest(&details, 1);
        assert_eq!(selection.highest, SemanticVersion::new(1, 1, 0));
        assert_eq!(selection.lowest, SemanticVersion::new(1, 0, 0));
        assert_eq!(ids(&selection), vec!["B"]);
    }

    #[test]
    fn empty_input_uses_zero_sentinels() {
        let selection = select_oldest(&[], 5);
        assert_eq!(selection.highest, SemanticVersion::zero());
        assert_eq!(selection.lowest, SemanticVersion::zero());
        assert!(selection.selected.is_empty());
    }

    #[test]
    fn uniform_versions_select_nothing() {
        let details = vec![detail("A", "2.0.0", 1), detail("B", "2.0.0", 2)];
        let selection = select_oldest(&details, 10);
        assert_eq!(selection.lowest, selection.highest);
        assert!(selection.selected.is_empty());
    }

    #[test]
    fn zero_cap_selects_nothing() {
        let details = vec![detail("A", "1.0.0", 1), detail("B", "2.0.0", 2)];
        let selection = select_oldest(&details, 0);
        assert!(selection.selected.is_empty());
        assert_eq!(selection.highest, SemanticVersion::new(2, 0, 0));
    }

    #[test]
    fn cap_larger_than_old_set() {
        let details = vec![
            detail("A", "0.9.0", 50),
            detail("B", "1.0.0", 10),
            detail("C", "0.9.0", 20),
            detail("D", "1.1.0", 1),
        ];
        let selection = select_oldest(&details, 10);
        assert_eq!(ids(&selection), vec!["C", "A", "B"]);
    }

    #[test]
    fn lowest_is_tracked_independently_of_order() {
        // Input order is not retirement order; lowest must still be found.
        let details = vec![
            detail("A", "3.0.0", 1),
            detail("B", "1.2.0", 99),
            detail("C", "2.0.0", 5),
        ];
        let selection = select_oldest(&details, 1);
        assert_eq!(selection.lowest, SemanticVersion::new(1, 2, 0));
        assert_eq!(ids(&selection), vec!["B"]);
    }
}
