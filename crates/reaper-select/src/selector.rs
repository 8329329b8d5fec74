//! Termination decision for a single autoscaling group.
//!
//! `decide` is the only place that turns a group snapshot and a `Policy`
//! into instance ids. It never lets the number of surviving healthy
//! instances drop below `policy.minimum_instance_count`.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use reaper_core::{
    AutoScalingGroup, Instance, InstanceId, InstanceVersionDetail, Policy, SelectionMode,
    SemanticVersion,
};

use crate::classify::classify;
use crate::join::index_by_id;
use crate::oldest::select_oldest;

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// `targets` holds the instances to terminate.
    Terminate,
    /// Not more healthy instances than the floor; the group is left alone.
    BelowMinimum,
    /// Unhealthy instances exist and some healthy ones reported no version.
    IncompleteVersionData,
    /// Every known version matches the canonical version.
    Converged,
    /// Nothing survived the caps.
    NothingToTerminate,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Terminate => "terminate",
            Verdict::BelowMinimum => "below minimum",
            Verdict::IncompleteVersionData => "incomplete version data",
            Verdict::Converged => "converged",
            Verdict::NothingToTerminate => "nothing to terminate",
        }
    }
}

/// Versions observed in a group, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSummary {
    /// Instances that reported a version.
    pub known: usize,
    pub lowest: SemanticVersion,
    pub highest: SemanticVersion,
    /// Instances behind `highest`, oldest first, capped at the removable count.
    pub stale: Vec<InstanceId>,
}

/// The outcome of [`decide`] for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub group: String,
    pub mode: SelectionMode,
    pub total: usize,
    pub healthy: Vec<InstanceId>,
    pub unhealthy: Vec<InstanceId>,
    pub versions: VersionSummary,
    pub verdict: Verdict,
    /// Ordered, deduplicated, capped ids to terminate.
    pub targets: Vec<InstanceId>,
}

impl Decision {
    pub fn is_actionable(&self) -> bool {
        self.verdict == Verdict::Terminate && !self.targets.is_empty()
    }
}

/// Decide which instances of `group` to terminate under `policy`.
pub fn decide(group: &AutoScalingGroup, policy: &Policy) -> Decision {
    let floor = policy.minimum_instance_count;
    let (healthy, unhealthy) = classify(&group.instances);
    let mode = policy.mode();

    let removable = group.instances.len().saturating_sub(floor);
    let members: HashSet<&str> = group.instances.iter().map(|i| i.id.as_str()).collect();
    let details: Vec<_> = group
        .version_details
        .iter()
        .filter(|d| members.contains(d.id.as_str()))
        .cloned()
        .collect();
    let oldest = select_oldest(&details, removable);

    let mut decision = Decision {
        group: group.name.clone(),
        mode: mode.clone(),
        total: group.instances.len(),
        healthy: ids(&healthy),
        unhealthy: ids(&unhealthy),
        versions: VersionSummary {
            known: details.len(),
            lowest: oldest.lowest,
            highest: oldest.highest,
            stale: oldest.selected.into_iter().map(|d| d.id).collect(),
        },
        verdict: Verdict::BelowMinimum,
        targets: Vec::new(),
    };

    if healthy.len() <= floor {
        return decision;
    }
    let healthy_budget = healthy.len() - floor;

    let candidates: Vec<&Instance> = match &mode {
        SelectionMode::RollingReplace => healthy[floor..]
            .iter()
            .chain(unhealthy.iter())
            .copied()
            .collect(),
        SelectionMode::CanonicalVersionMatch(canonical) => {
            let index = index_by_id(&details);

            let healthy_known = healthy
                .iter()
                .filter(|i| index.contains_key(i.id.as_str()))
                .count();
            if !unhealthy.is_empty() && healthy_known != healthy.len() {
                decision.verdict = Verdict::IncompleteVersionData;
                return decision;
            }

            let mismatched: HashSet<&str> = details
                .iter()
                .filter(|d| d.version != *canonical)
                .map(|d| d.id.as_str())
                .collect();
            if mismatched.is_empty() {
                decision.verdict = Verdict::Converged;
                return decision;
            }

            // Mismatched healthy, then unhealthy (mismatched ones first).
            let mut ordered = mismatched_in(&healthy, &mismatched, &index);
            ordered.extend(mismatched_in(&unhealthy, &mismatched, &index));
            ordered.extend(
                unhealthy
                    .iter()
                    .filter(|i| !mismatched.contains(i.id.as_str())),
            );
            ordered
        }
    };

    decision.targets = cap_targets(&candidates, removable, healthy_budget);
    decision.verdict = if decision.targets.is_empty() {
        Verdict::NothingToTerminate
    } else {
        Verdict::Terminate
    };
    decision
}

/// Walk `candidates` in priority order, dropping repeats and stopping at
/// `maximum` ids. At most `healthy_budget` healthy instances are taken.
fn cap_targets(candidates: &[&Instance], maximum: usize, healthy_budget: usize) -> Vec<InstanceId> {
    let mut seen = HashSet::new();
    let mut healthy_taken = 0;
    let mut targets = Vec::new();

    for instance in candidates {
        if targets.len() >= maximum {
            break;
        }
        if !seen.insert(instance.id.as_str()) {
            continue;
        }
        if instance.is_healthy() {
            if healthy_taken >= healthy_budget {
                continue;
            }
            healthy_taken += 1;
        }
        targets.push(instance.id.clone());
    }

    targets
}

/// Members of `subset` whose version is mismatched, in retirement order.
fn mismatched_in<'a>(
    subset: &[&'a Instance],
    mismatched: &HashSet<&str>,
    index: &HashMap<&str, &InstanceVersionDetail>,
) -> Vec<&'a Instance> {
    let mut picked: Vec<&Instance> = subset
        .iter()
        .filter(|i| mismatched.contains(i.id.as_str()))
        .copied()
        .collect();
    picked.sort_by(|a, b| index[a.id.as_str()].retirement_order(index[b.id.as_str()]));
    picked
}

fn ids(instances: &[&Instance]) -> Vec<InstanceId> {
    instances.iter().map(|i| i.id.clone()).collect()
}
