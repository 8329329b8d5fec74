//! reaper.toml configuration parser.
//!
//! Every field is optional. Missing values fall back to the built-in
//! defaults; the CLI applies its own flags on top of the result.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Policy, ProbeTarget};
use crate::version::SemanticVersion;

pub const DEFAULT_REGION: &str = "eu-west-1";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReaperConfig {
    pub policy: Option<PolicyConfig>,
    pub probe: Option<ProbeConfig>,
    pub provider: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub minimum_instance_count: Option<usize>,
    pub canonical_version: Option<String>,
    pub only_terminate_old_versions: Option<bool>,
    pub dry_run: Option<bool>,
    pub groups: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub scheme: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub region: Option<String>,
    /// JSON snapshot of groups and instances.
    pub inventory: Option<PathBuf>,
    /// JSON-lines file that receives termination requests.
    pub ledger: Option<PathBuf>,
}

impl ReaperConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve the `[policy]` table against the defaults.
    pub fn policy(&self) -> ConfigResult<Policy> {
        let mut policy = Policy::default();
        let Some(cfg) = &self.policy else {
            return Ok(policy);
        };

        if let Some(min) = cfg.minimum_instance_count {
            policy.minimum_instance_count = min;
        }
        if let Some(version) = &cfg.canonical_version {
            policy.canonical_version = Some(SemanticVersion::parse(version)?);
        }
        if let Some(only_old) = cfg.only_terminate_old_versions {
            policy.only_terminate_old_versions = only_old;
        }
        if let Some(dry_run) = cfg.dry_run {
            policy.is_dry_run = dry_run;
        }
        if let Some(groups) = &cfg.groups {
            policy.group_name_filter = groups.clone();
        }
        Ok(policy)
    }

    /// Resolve the `[probe]` table against the defaults.
    pub fn probe_target(&self) -> ConfigResult<ProbeTarget> {
        let mut target = ProbeTarget::default();
        if let Some(cfg) = &self.probe {
            if let Some(scheme) = &cfg.scheme {
                target.scheme = scheme.clone();
            }
            if let Some(port) = cfg.port {
                target.port = port;
            }
            if let Some(path) = &cfg.path {
                target.path = path.clone();
            }
            if let Some(timeout) = &cfg.timeout {
                target.timeout = parse_duration(timeout)
                    .ok_or_else(|| ConfigError::InvalidDuration(timeout.clone()))?;
            }
        }
        validate_scheme(&target.scheme)?;
        Ok(target)
    }

    pub fn region(&self) -> String {
        self.provider
            .as_ref()
            .and_then(|p| p.region.clone())
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }
}

/// The version probe speaks plain HTTP only.
pub fn validate_scheme(scheme: &str) -> ConfigResult<()> {
    if scheme.eq_ignore_ascii_case("http") {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedScheme(scheme.to_string()))
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// Split a comma-separated group list, dropping empty segments.
pub fn parse_group_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ReaperConfig::from_toml("").unwrap();

        let policy = config.policy().unwrap();
        assert_eq!(policy, Policy::default());
        assert!(policy.is_dry_run);
        assert_eq!(policy.minimum_instance_count, 1);

        assert_eq!(config.probe_target().unwrap(), ProbeTarget::default());
        assert_eq!(config.region(), "eu-west-1");
    }

    #[test]
    fn parses_full_config() {
        let config = ReaperConfig::from_toml(
            r#"
[policy]
minimum_instance_count = 3
canonical_version = "1.4.0"
dry_run = false
groups = ["api", "worker"]

[probe]
port = 8080
path = "/version"
timeout = "500ms"

[provider]
region = "us-east-1"
inventory = "/etc/reaper/inventory.json"
"#,
        )
        .unwrap();

        let policy = config.policy().unwrap();
        assert_eq!(policy.minimum_instance_count, 3);
        assert_eq!(policy.canonical_version, Some(SemanticVersion::new(1, 4, 0)));
        assert!(policy.only_terminate_old_versions);
        assert!(!policy.is_dry_run);
        assert_eq!(policy.group_name_filter, vec!["api", "worker"]);

        let probe = config.probe_target().unwrap();
        assert_eq!(probe.port, 8080);
        assert_eq!(probe.path, "/version");
        assert_eq!(probe.timeout, Duration::from_millis(500));

        assert_eq!(config.region(), "us-east-1");
    }

    #[test]
    fn malformed_canonical_version_is_an_error() {
        let config = ReaperConfig::from_toml("[policy]\ncanonical_version = \"one\"\n").unwrap();
        assert!(matches!(
            config.policy(),
            Err(ConfigError::CanonicalVersion(_))
        ));
    }

    #[test]
    fn https_probe_is_rejected() {
        let config = ReaperConfig::from_toml("[probe]\nscheme = \"https\"\n").unwrap();
        assert!(matches!(
            config.probe_target(),
            Err(ConfigError::UnsupportedScheme(s)) if s == "https"
        ));
    }

    #[test]
    fn invalid_timeout_is_an_error() {
        let config = ReaperConfig::from_toml("[probe]\ntimeout = \"soon\"\n").unwrap();
        assert!(matches!(
            config.probe_target(),
            Err(ConfigError::InvalidDuration(_))
        ));
    }

    #[test]
    fn parse_duration_values() {
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("later"), None);
    }

    #[test]
    fn group_list_splits_on_commas() {
        assert_eq!(parse_group_list("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_group_list(" a , ,b,"), vec!["a", "b"]);
        assert!(parse_group_list("").is_empty());
    }
}
