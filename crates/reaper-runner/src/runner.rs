//! The run loop.
//!
//! Lists groups once, then handles them one at a time: decide, narrate,
//! gate, terminate. The terminated-id accumulator is the only state
//! carried from one group to the next.

use tracing::{debug, error, info, warn};

use reaper_core::{Policy, ProbeTarget};
use reaper_provider::CloudProvider;
use reaper_select::{Decision, Verdict, decide, filter_groups};

use crate::error::RunError;
use crate::gate;
use crate::report::RunReport;

/// Drives one termination pass over a provider's groups.
pub struct Reaper<P> {
    provider: P,
}

impl<P: CloudProvider> Reaper<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run a single pass under `policy`.
    ///
    /// Never fails: a provider that cannot list groups yields an empty
    /// report, and a failed termination only drops that group's ids.
    pub async fn run(&self, policy: &Policy, probe: &ProbeTarget) -> RunReport {
        let mut report = RunReport::new(policy.is_dry_run);
        let mode = policy.mode();

        info!(
            dry_run = policy.is_dry_run,
            minimum_instance_count = policy.minimum_instance_count,
            mode = mode.label(),
            "reaper activated"
        );

        let groups = match self
            .provider
            .describe_auto_scaling_groups(&policy.group_name_filter, probe)
            .await
        {
            Ok(groups) => groups,
            Err(source) => {
                let e = RunError::Describe(source);
                error!(error = %e, "exiting without processing any group");
                return report;
            }
        };
        let groups = filter_groups(groups, &policy.group_name_filter);

        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        info!(groups = ?names, "working on groups");

        for group in &groups {
            let decision = decide(group, policy);
            narrate(&decision);

            if decision.is_actionable() {
                let terminated = gate::apply(
                    &decision.group,
                    &decision.targets,
                    policy.is_dry_run,
                    |ids| self.provider.terminate_instances(ids),
                )
                .await;
                report.terminated.extend(terminated);
            }

            report.groups.push(decision);
        }

        info!(
            groups = ?names,
            selected = report.selected(),
            terminated = report.terminated.len(),
            "completed all groups"
        );
        report
    }
}

fn narrate(decision: &Decision) {
    let group = decision.group.as_str();

    info!(
        group,
        total = decision.total,
        healthy = decision.healthy.len(),
        unhealthy = decision.unhealthy.len(),
        mode = decision.mode.label(),
        "group classified"
    );

    if decision.versions.known > 0 {
        debug!(
            group,
            known = decision.versions.known,
            lowest = %decision.versions.lowest,
            highest = %decision.versions.highest,
            stale = ?decision.versions.stale,
            "observed versions"
        );
    }

    match decision.verdict {
        Verdict::Terminate => info!(
            group,
            count = decision.targets.len(),
            of = decision.total,
            targets = ?decision.targets,
            "selected instances for termination"
        ),
        Verdict::BelowMinimum => info!(
            group,
            healthy = decision.healthy.len(),
            "no action taken, healthy instances at or below minimum"
        ),
        Verdict::IncompleteVersionData => warn!(
            group,
            "no action taken, unhealthy instances present and healthy version data incomplete"
        ),
        Verdict::Converged => info!(group, "no action taken, all versions match canonical"),
        Verdict::NothingToTerminate => info!(group, "no action taken, no instances to terminate"),
    }
}
