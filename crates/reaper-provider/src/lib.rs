//! reaper-provider: the boundary between the reaper and the platform.
//!
//! A [`CloudProvider`] enumerates autoscaling groups (with per-instance
//! version details attached), probes a single instance's version, and
//! submits termination requests. The selector never talks to a provider
//! directly; the runner does.
//!
//! # Components
//!
//! - **`probe`**: HTTP/1.1 GET against an instance's version endpoint
//! - **`inventory`**: `InventoryProvider`, backed by a JSON snapshot of
//!   the fleet and a JSON-lines termination ledger

use std::future::Future;

use reaper_core::{AutoScalingGroup, InstanceVersionDetail, ProbeTarget};

pub mod error;
pub mod inventory;
pub mod probe;

pub use error::{ProviderError, ProviderResult};
pub use inventory::{Inventory, InventoryGroup, InventoryInstance, InventoryProvider, TerminationRequest};
pub use probe::{MAX_BODY_BYTES, fetch_version};

/// Platform operations the reaper needs. Injected into the runner so
/// tests can substitute an in-memory fleet.
pub trait CloudProvider {
    /// Groups matching `names` (case-insensitive, empty means all), each
    /// with version details for the instances that answered a probe.
    /// Details come back in retirement order.
    fn describe_auto_scaling_groups(
        &self,
        names: &[String],
        probe: &ProbeTarget,
    ) -> impl Future<Output = ProviderResult<Vec<AutoScalingGroup>>>;

    /// Probe a single instance.
    fn get_instance_version_detail(
        &self,
        instance_id: &str,
        probe: &ProbeTarget,
    ) -> impl Future<Output = ProviderResult<InstanceVersionDetail>>;

    /// Request termination of `instance_ids`. A single call per group.
    fn terminate_instances(&self, instance_ids: &[String]) -> impl Future<Output = ProviderResult<()>>;
}
