//! reaper-core: shared domain types for the fleet reaper.
//!
//! Instances, autoscaling groups, per-instance version details, the
//! termination `Policy`, and the `reaper.toml` configuration file.

pub mod config;
pub mod error;
pub mod types;
pub mod version;

pub use config::{DEFAULT_REGION, ReaperConfig, parse_duration, parse_group_list, validate_scheme};
pub use error::{ConfigError, ConfigResult, VersionError};
pub use types::*;
pub use version::SemanticVersion;
