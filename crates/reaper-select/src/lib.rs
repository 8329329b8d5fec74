//! reaper-select: deciding which instances to terminate.
//!
//! Every function in this crate is pure: it takes snapshots of groups
//! and a `Policy` and returns data. Logging and side effects belong to
//! the caller (see `reaper-runner`).
//!
//! # Components
//!
//! - **`classify`**: stable healthy/unhealthy partition
//! - **`join`**: attach version details to instances, oldest first
//! - **`oldest`**: lowest/highest version and the stale subset
//! - **`selector`**: the termination decision for one group
//! - **`filter`**: restrict a run to named groups
//!
//! # Decision outline
//!
//! ```text
//! healthy, unhealthy = classify(group.instances)
//! if len(healthy) <= floor: hold
//!
//! RollingReplace:        healthy[floor..] ++ unhealthy
//! CanonicalVersionMatch: mismatched healthy ++ unhealthy
//!                        (hold if unhealthy exist and healthy version data is partial)
//!
//! cap: total     <= len(instances) - floor
//!      healthy   <= len(healthy) - floor
//! ```

pub mod classify;
pub mod filter;
pub mod join;
pub mod oldest;
pub mod selector;

pub use classify::classify;
pub use filter::filter_groups;
pub use join::{join, sort_details};
pub use oldest::{OldestSelection, select_oldest};
pub use selector::{Decision, Verdict, VersionSummary, decide};
