pub mod describe;
pub mod run;

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use reaper_core::{
    ConfigError, Policy, ProbeTarget, ReaperConfig, SemanticVersion, parse_duration,
    parse_group_list, validate_scheme,
};
use reaper_provider::InventoryProvider;

/// Where the fleet comes from and how to probe it. Flags win over
/// `reaper.toml`, which wins over the built-in defaults.
#[derive(Args, Debug)]
pub struct ProviderArgs {
    /// Path to reaper.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Region recorded with termination requests (default: eu-west-1)
    #[arg(long)]
    pub region: Option<String>,
    /// JSON inventory of groups and instances
    #[arg(long)]
    pub inventory: Option<PathBuf>,
    /// JSON-lines file that receives termination requests
    #[arg(long)]
    pub ledger: Option<PathBuf>,
    /// Version endpoint scheme (only http is supported)
    #[arg(long)]
    pub scheme: Option<String>,
    /// Version endpoint port (default: 80)
    #[arg(long)]
    pub port: Option<u16>,
    /// Version endpoint path (default: /version/)
    #[arg(long)]
    pub path: Option<String>,
    /// Deadline for a single version probe, e.g. 2s or 500ms
    #[arg(long)]
    pub probe_timeout: Option<String>,
}

impl ProviderArgs {
    pub fn load(&self) -> anyhow::Result<ReaperConfig> {
        match &self.config {
            Some(path) => ReaperConfig::from_file(path)
                .with_context(|| format!("failed to load {}", path.display())),
            None => Ok(ReaperConfig::default()),
        }
    }

    pub fn probe_target(&self, config: &ReaperConfig) -> anyhow::Result<ProbeTarget> {
        let mut target = config.probe_target()?;
        if let Some(scheme) = &self.scheme {
            validate_scheme(scheme)?;
            target.scheme = scheme.clone();
        }
        if let Some(port) = self.port {
            target.port = port;
        }
        if let Some(path) = &self.path {
            target.path = path.clone();
        }
        if let Some(timeout) = &self.probe_timeout {
            target.timeout = parse_duration(timeout)
                .ok_or_else(|| ConfigError::InvalidDuration(timeout.clone()))?;
        }
        Ok(target)
    }

    pub fn inventory_provider(&self, config: &ReaperConfig) -> anyhow::Result<InventoryProvider> {
        let file = config.provider.as_ref();
        let inventory = self
            .inventory
            .clone()
            .or_else(|| file.and_then(|p| p.inventory.clone()))
            .context("no inventory configured; pass --inventory or set [provider].inventory")?;
        let region = self.region.clone().unwrap_or_else(|| config.region());

        let mut provider = InventoryProvider::new(inventory).with_region(&region);
        if let Some(ledger) = self
            .ledger
            .clone()
            .or_else(|| file.and_then(|p| p.ledger.clone()))
        {
            provider = provider.with_ledger(ledger);
        }
        Ok(provider)
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub provider: ProviderArgs,
    /// Compute decisions without terminating anything (default: true)
    #[arg(long)]
    pub dry_run: Option<bool>,
    /// Healthy instances every group keeps (default: 1)
    #[arg(long)]
    pub minimum_instance_count: Option<usize>,
    /// With a canonical version, only terminate instances that differ from it (default: true)
    #[arg(long)]
    pub terminate_old_versions: Option<bool>,
    /// Comma-separated group names to process (default: all)
    #[arg(long)]
    pub groups: Option<String>,
    /// Version the fleet should converge to, e.g. 1.4.0
    #[arg(long)]
    pub canonical_version: Option<String>,
    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

impl RunArgs {
    /// Resolve the termination policy. A malformed canonical version is
    /// an error here, before any group is looked at.
    pub fn policy(&self, config: &ReaperConfig) -> anyhow::Result<Policy> {
        let mut policy = config.policy()?;
        if let Some(dry_run) = self.dry_run {
            policy.is_dry_run = dry_run;
        }
        if let Some(min) = self.minimum_instance_count {
            policy.minimum_instance_count = min;
        }
        if let Some(only_old) = self.terminate_old_versions {
            policy.only_terminate_old_versions = only_old;
        }
        if let Some(groups) = &self.groups {
            policy.group_name_filter = parse_group_list(groups);
        }
        if let Some(version) = &self.canonical_version {
            let version = SemanticVersion::from_response_body(version)
                .context("invalid --canonical-version")?;
            policy.canonical_version = Some(version);
        }
        Ok(policy)
    }
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub provider: ProviderArgs,
    /// Comma-separated group names (default: all)
    #[arg(long)]
    pub groups: Option<String>,
    /// Probe a single instance instead of listing groups
    #[arg(long)]
    pub instance: Option<String>,
    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub format: String,
}
