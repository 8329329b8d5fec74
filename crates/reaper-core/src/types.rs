//! Domain types shared by the selector, providers, and runner.
//!
//! Everything here is a read-only snapshot taken from the provider at
//! the start of a run. Decisions are derived from these values; nothing
//! mutates them in place.

use std::cmp::Ordering;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::version::SemanticVersion;

/// Provider-assigned identifier of an instance.
pub type InstanceId = String;

/// Unix timestamp (seconds).
pub type Timestamp = u64;

// ── Instance ──────────────────────────────────────────────────────

/// An instance as reported by the autoscaling group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Instance {
    pub id: InstanceId,
    /// Provider health status, e.g. "Healthy" or "Unhealthy".
    pub health_status: String,
    /// Provider lifecycle state, e.g. "InService" or "Terminating".
    pub lifecycle_state: String,
}

impl Instance {
    pub fn new(id: &str, health_status: &str, lifecycle_state: &str) -> Self {
        Self {
            id: id.to_string(),
            health_status: health_status.to_string(),
            lifecycle_state: lifecycle_state.to_string(),
        }
    }

    /// Healthy and in service. Case-insensitive; never looks at version.
    pub fn is_healthy(&self) -> bool {
        self.health_status.eq_ignore_ascii_case("Healthy")
            && self.lifecycle_state.eq_ignore_ascii_case("InService")
    }
}

// ── Version details ───────────────────────────────────────────────

/// Version reported by an instance's version endpoint, plus its launch time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceVersionDetail {
    pub id: InstanceId,
    pub version: SemanticVersion,
    pub launch_time: Timestamp,
}

impl InstanceVersionDetail {
    pub fn new(id: &str, version: SemanticVersion, launch_time: Timestamp) -> Self {
        Self {
            id: id.to_string(),
            version,
            launch_time,
        }
    }

    /// Retirement order: lower versions first, then longest-running first.
    pub fn retirement_order(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then(self.launch_time.cmp(&other.launch_time))
    }
}

// ── Autoscaling group ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutoScalingGroup {
    pub name: String,
    pub instances: Vec<Instance>,
    /// Best-effort: instances whose probe failed have no entry here.
    #[serde(default)]
    pub version_details: Vec<InstanceVersionDetail>,
}

impl AutoScalingGroup {
    pub fn new(name: &str, instances: Vec<Instance>) -> Self {
        Self {
            name: name.to_string(),
            instances,
            version_details: Vec::new(),
        }
    }

    pub fn with_version_details(mut self, details: Vec<InstanceVersionDetail>) -> Self {
        self.version_details = details;
        self
    }
}

// ── Policy ────────────────────────────────────────────────────────

/// How a group's termination candidates are chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "version", rename_all = "snake_case")]
pub enum SelectionMode {
    /// Unhealthy instances plus every healthy instance beyond the floor.
    RollingReplace,
    /// Instances whose version differs from the canonical version.
    CanonicalVersionMatch(SemanticVersion),
}

impl SelectionMode {
    pub fn label(&self) -> &'static str {
        match self {
            SelectionMode::RollingReplace => "rolling-replace",
            SelectionMode::CanonicalVersionMatch(_) => "canonical-version-match",
        }
    }
}

/// Termination policy for a run. Passed by value into the selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Healthy instances that must survive in every group.
    pub minimum_instance_count: usize,
    /// Target version the fleet converges toward.
    pub canonical_version: Option<SemanticVersion>,
    /// Only terminate instances whose version mismatches the canonical one.
    pub only_terminate_old_versions: bool,
    /// Compute and report decisions without terminating anything.
    pub is_dry_run: bool,
    /// Case-insensitive group names to process. Empty means all groups.
    pub group_name_filter: Vec<String>,
}

impl Policy {
    pub fn mode(&self) -> SelectionMode {
        match (&self.canonical_version, self.only_terminate_old_versions) {
            (Some(version), true) => SelectionMode::CanonicalVersionMatch(version.clone()),
            _ => SelectionMode::RollingReplace,
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            minimum_instance_count: 1,
            canonical_version: None,
            only_terminate_old_versions: true,
            is_dry_run: true,
            group_name_filter: Vec::new(),
        }
    }
}

// ── Probe target ──────────────────────────────────────────────────

/// Where to find the version endpoint on every instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub scheme: String,
    pub port: u16,
    pub path: String,
    /// Deadline for a single probe, connect included.
    pub timeout: Duration,
}

impl ProbeTarget {
    /// `host:port` for an instance at `address`. IPv6 addresses are bracketed.
    pub fn authority_for(&self, address: &str) -> String {
        if address.contains(':') {
            format!("[{}]:{}", address, self.port)
        } else {
            format!("{}:{}", address, self.port)
        }
    }

    /// Full URL for an instance at `address`.
    pub fn url_for(&self, address: &str) -> String {
        format!("{}://{}{}", self.scheme, self.authority_for(address), self.path)
    }
}

impl Default for ProbeTarget {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            port: 80,
            path: "/version/".to_string(),
            timeout: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_requires_both_fields() {
        let instances = [
            Instance::new("A", "Healthy", "InService"),
            Instance::new("B", "Healthy", "OutOfService"),
            Instance::new("C", "Unhealthy", "InService"),
        ];

        let health: Vec<bool> = instances.iter().map(Instance::is_healthy).collect();
        assert_eq!(health, vec![true, false, false]);
    }

    #[test]
    fn health_is_case_insensitive() {
        assert!(Instance::new("A", "healthy", "inservice").is_healthy());
        assert!(Instance::new("A", "HEALTHY", "INSERVICE").is_healthy());
    }

    #[test]
    fn retirement_order_prefers_version_then_age() {
        let v1 = SemanticVersion::new(1, 0, 0);
        let v2 = SemanticVersion::new(2, 0, 0);

        let old_version_new_launch = InstanceVersionDetail::new("A", v1.clone(), 500);
        let new_version_old_launch = InstanceVersionDetail::new("B", v2, 100);
        let old_version_old_launch = InstanceVersionDetail::new("C", v1, 100);

        assert_eq!(
            old_version_new_launch.retirement_order(&new_version_old_launch),
            Ordering::Less
        );
        assert_eq!(
            old_version_old_launch.retirement_order(&old_version_new_launch),
            Ordering::Less
        );
    }

    #[test]
    fn mode_requires_canonical_and_flag() {
        let mut policy = Policy::default();
        assert_eq!(policy.mode(), SelectionMode::RollingReplace);

        policy.canonical_version = Some(SemanticVersion::new(1, 1, 0));
        assert_eq!(
            policy.mode(),
            SelectionMode::CanonicalVersionMatch(SemanticVersion::new(1, 1, 0))
        );

        policy.only_terminate_old_versions = false;
        assert_eq!(policy.mode(), SelectionMode::RollingReplace);
    }

    #[test]
    fn probe_url() {
        let target = ProbeTarget::default();
        assert_eq!(target.url_for("10.0.0.7"), "http://10.0.0.7:80/version/");
        assert_eq!(target.authority_for("fd00::7"), "[fd00::7]:80");
    }
}
