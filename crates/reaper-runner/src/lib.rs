//! reaper-runner: the termination pass.
//!
//! Wires a `CloudProvider` to the pure decision functions in
//! `reaper-select`, owns all run narration, and enforces dry run.
//!
//! # Run outline
//!
//! ```text
//! groups = provider.describe(policy.groups)      (failure → empty report)
//! for group in filter(groups, policy.groups):
//!     decision = decide(group, policy)
//!     log decision
//!     terminated += gate(decision.targets, dry_run, provider.terminate)
//! ```

pub mod error;
pub mod gate;
pub mod report;
pub mod runner;

pub use error::RunError;
pub use report::{RunReport, format_report};
pub use runner::Reaper;
