//! Run report and its human-readable rendering.

use serde::Serialize;

use reaper_core::InstanceId;
use reaper_select::Decision;

/// Everything a run decided and did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    /// One decision per processed group, in processing order.
    pub groups: Vec<Decision>,
    /// Ids whose termination was requested successfully.
    pub terminated: Vec<InstanceId>,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Targets selected across all groups, terminated or not.
    pub fn selected(&self) -> usize {
        self.groups.iter().map(|d| d.targets.len()).sum()
    }
}

pub fn format_report(report: &RunReport) -> String {
    let mut out = String::new();

    if report.dry_run {
        out.push_str("Reaper run [DRY RUN]\n\n");
    } else {
        out.push_str("Reaper run\n\n");
    }

    if report.groups.is_empty() {
        out.push_str("No groups processed.\n");
        return out;
    }

    for d in &report.groups {
        out.push_str(&format!(
            "{}: {} instances ({} healthy, {} unhealthy), {}\n",
            d.group,
            d.total,
            d.healthy.len(),
            d.unhealthy.len(),
            d.mode.label()
        ));
        if d.versions.known > 0 {
            out.push_str(&format!(
                "  versions: {} known, lowest {}, highest {}\n",
                d.versions.known, d.versions.lowest, d.versions.highest
            ));
        }
        if !d.versions.stale.is_empty() {
            out.push_str(&format!("  stale:    {}\n", d.versions.stale.join(", ")));
        }
        out.push_str(&format!("  verdict:  {}\n", d.verdict.label()));
        if !d.targets.is_empty() {
            out.push_str(&format!("  targets:  {}\n", d.targets.join(", ")));
        }
        out.push('\n');
    }

    if report.terminated.is_empty() {
        out.push_str(&format!(
            "Selected {} instance(s), terminated none.\n",
            report.selected()
        ));
    } else {
        out.push_str(&format!(
            "Selected {} instance(s), terminated {}: {}\n",
            report.selected(),
            report.terminated.len(),
            report.terminated.join(", ")
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use reaper_core::{AutoScalingGroup, Instance, Policy};
    use reaper_select::decide;

    fn report(dry_run: bool) -> RunReport {
        let group = AutoScalingGroup::new(
            "api",
            vec![
                Instance::new("A", "Healthy", "InService"),
                Instance::new("B", "Healthy", "InService"),
                Instance::new("C", "Healthy", "OutOfService"),
            ],
        );
        let policy = Policy {
            minimum_instance_count: 1,
            is_dry_run: dry_run,
            ..Policy::default()
        };

        let mut report = RunReport::new(dry_run);
        report.groups.push(decide(&group, &policy));
        if !dry_run {
            report.terminated = vec!["B".to_string(), "C".to_string()];
        }
        report
    }

    #[test]
    fn text_report_lists_targets() {
        let text = format_report(&report(true));
        assert!(text.starts_with("Reaper run [DRY RUN]"));
        assert!(text.contains("api: 3 instances (2 healthy, 1 unhealthy), rolling-replace"));
        assert!(text.contains("targets:  B, C"));
        assert!(text.contains("Selected 2 instance(s), terminated none."));
    }

    #[test]
    fn text_report_lists_terminated() {
        let text = format_report(&report(false));
        assert!(text.contains("terminated 2: B, C"));
    }

    #[test]
    fn empty_report() {
        let text = format_report(&RunReport::new(false));
        assert!(text.contains("No groups processed."));
    }

    #[test]
    fn json_report_shape() {
        let value = serde_json::to_value(report(true)).unwrap();
        assert_eq!(value["dry_run"], true);
        assert_eq!(value["groups"][0]["verdict"], "terminate");
        assert_eq!(value["groups"][0]["targets"][1], "C");
        assert_eq!(value["terminated"].as_array().unwrap().len(), 0);
    }
}
