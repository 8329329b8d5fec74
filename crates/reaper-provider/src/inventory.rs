//! Inventory-backed provider.
//!
//! Groups and instances come from a JSON snapshot exported by the
//! platform (one entry per group, with each instance's health, lifecycle
//! state, private address, and launch time). Versions are probed live.
//! Termination requests are appended to a JSON-lines ledger that the
//! platform's executor drains; instances already in the ledger are left
//! out of later snapshots.
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "name": "api",
//!       "instances": [
//!         {
//!           "id": "i-0a1b",
//!           "health_status": "Healthy",
//!           "lifecycle_state": "InService",
//!           "private_address": "10.0.3.17",
//!           "launch_time": 1717000000
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use reaper_core::{
    AutoScalingGroup, Instance, InstanceVersionDetail, ProbeTarget, Timestamp, DEFAULT_REGION,
};
use reaper_select::{filter_groups, join};

use crate::error::{ProviderError, ProviderResult};
use crate::probe::fetch_version;
use crate::CloudProvider;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub groups: Vec<InventoryGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryGroup {
    pub name: String,
    #[serde(default)]
    pub instances: Vec<InventoryInstance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryInstance {
    pub id: String,
    pub health_status: String,
    pub lifecycle_state: String,
    pub private_address: Option<String>,
    #[serde(default)]
    pub launch_time: Timestamp,
}

impl InventoryInstance {
    fn to_instance(&self) -> Instance {
        Instance::new(&self.id, &self.health_status, &self.lifecycle_state)
    }
}

/// One line of the termination ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationRequest {
    pub region: String,
    pub instances: Vec<String>,
    pub requested_at: Timestamp,
}

/// A `CloudProvider` over an inventory file and a termination ledger.
#[derive(Debug, Clone)]
pub struct InventoryProvider {
    inventory: PathBuf,
    ledger: Option<PathBuf>,
    region: String,
}

impl InventoryProvider {
    pub fn new(inventory: impl Into<PathBuf>) -> Self {
        Self {
            inventory: inventory.into(),
            ledger: None,
            region: DEFAULT_REGION.to_string(),
        }
    }

    /// Record termination requests in `path`. Without a ledger every
    /// termination request fails.
    pub fn with_ledger(mut self, path: impl Into<PathBuf>) -> Self {
        self.ledger = Some(path.into());
        self
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Load the snapshot, dropping instances that already have a
    /// termination request on file. Group names must be unique.
    pub async fn load(&self) -> ProviderResult<Inventory> {
        let content = read_file(&self.inventory).await?;
        let mut inventory: Inventory = serde_json::from_str(&content)?;

        let mut names = HashSet::new();
        for group in &inventory.groups {
            if !names.insert(group.name.as_str()) {
                return Err(ProviderError::DuplicateGroup(group.name.clone()));
            }
        }

        let requested = self.requested_terminations().await?;
        if !requested.is_empty() {
            for group in &mut inventory.groups {
                group.instances.retain(|i| !requested.contains(&i.id));
            }
        }
        Ok(inventory)
    }

    /// Instance ids already present in the ledger.
    pub async fn requested_terminations(&self) -> ProviderResult<HashSet<String>> {
        let Some(ledger) = &self.ledger else {
            return Ok(HashSet::new());
        };
        let content = match tokio::fs::read_to_string(ledger).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(source) => {
                return Err(ProviderError::Io {
                    path: ledger.clone(),
                    source,
                });
            }
        };

        let mut ids = HashSet::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            let request: TerminationRequest = serde_json::from_str(line)?;
            ids.extend(request.instances);
        }
        Ok(ids)
    }

    async fn probe_instance(
        &self,
        record: &InventoryInstance,
        probe: &ProbeTarget,
    ) -> ProviderResult<InstanceVersionDetail> {
        let address = record
            .private_address
            .as_deref()
            .ok_or_else(|| ProviderError::NoAddress(record.id.clone()))?;
        let version = fetch_version(address, probe).await?;
        Ok(InstanceVersionDetail::new(&record.id, version, record.launch_time))
    }
}

impl CloudProvider for InventoryProvider {
    async fn describe_auto_scaling_groups(
        &self,
        names: &[String],
        probe: &ProbeTarget,
    ) -> ProviderResult<Vec<AutoScalingGroup>> {
        let inventory = self.load().await?;
        debug!(
            path = %self.inventory.display(),
            groups = inventory.groups.len(),
            "loaded inventory"
        );

        let records: HashMap<&str, &InventoryGroup> = inventory
            .groups
            .iter()
            .map(|g| (g.name.as_str(), g))
            .collect();
        let groups: Vec<AutoScalingGroup> = inventory
            .groups
            .iter()
            .map(|g| {
                let instances = g.instances.iter().map(InventoryInstance::to_instance).collect();
                AutoScalingGroup::new(&g.name, instances)
            })
            .collect();
        let groups = filter_groups(groups, names);

        let mut described = Vec::with_capacity(groups.len());
        for group in groups {
            let Some(record) = records.get(group.name.as_str()) else {
                continue;
            };

            // Probe sequentially; failures leave the instance without a detail.
            let mut probed: HashMap<&str, InstanceVersionDetail> = HashMap::new();
            for instance in &record.instances {
                match self.probe_instance(instance, probe).await {
                    Ok(detail) => {
                        debug!(
                            group = %group.name,
                            instance = %instance.id,
                            version = %detail.version,
                            "version probed"
                        );
                        probed.insert(instance.id.as_str(), detail);
                    }
                    Err(e) => {
                        warn!(
                            group = %group.name,
                            instance = %instance.id,
                            error = %e,
                            "version probe failed"
                        );
                    }
                }
            }

            let details = join(&group.instances, |i| probed.remove(i.id.as_str()));
            described.push(group.with_version_details(details));
        }

        Ok(described)
    }

    async fn get_instance_version_detail(
        &self,
        instance_id: &str,
        probe: &ProbeTarget,
    ) -> ProviderResult<InstanceVersionDetail> {
        let inventory = self.load().await?;
        let record = inventory
            .groups
            .iter()
            .flat_map(|g| g.instances.iter())
            .find(|i| i.id == instance_id)
            .ok_or_else(|| ProviderError::InstanceNotFound(instance_id.to_string()))?;
        self.probe_instance(record, probe).await
    }

    async fn terminate_instances(&self, instance_ids: &[String]) -> ProviderResult<()> {
        let ledger = self
            .ledger
            .as_ref()
            .ok_or_else(|| ProviderError::Terminate("no termination ledger configured".to_string()))?;

        let request = TerminationRequest {
            region: self.region.clone(),
            instances: instance_ids.to_vec(),
            requested_at: epoch_secs(),
        };
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(ledger)
            .await
            .map_err(|source| ProviderError::Io {
                path: ledger.clone(),
                source,
            })?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|source| ProviderError::Io {
                path: ledger.clone(),
                source,
            })?;
        file.flush().await.map_err(|source| ProviderError::Io {
            path: ledger.clone(),
            source,
        })?;

        info!(
            ledger = %ledger.display(),
            count = instance_ids.len(),
            "termination requested"
        );
        Ok(())
    }
}

async fn read_file(path: &Path) -> ProviderResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ProviderError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
