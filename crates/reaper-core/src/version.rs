//! Semantic versions as reported by instances.
//!
//! Wraps `semver::Version` with an ordering that ignores build metadata,
//! so `1.2.0+abc` and `1.2.0+def` count as the same release. A pre-release
//! sorts below the release of the same triple.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemanticVersion(semver::Version);

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// `0.0.0`, used when no version has been observed.
    pub fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Strict parse of a `major.minor.patch[-pre][+build]` string.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        semver::Version::parse(input)
            .map(Self)
            .map_err(|e| VersionError {
                input: input.to_string(),
                reason: e.to_string(),
            })
    }

    /// Parse the body of a version endpoint response.
    ///
    /// Accepts `1.2.3`, `"1.2.3"`, `v1.2.3` and `"v1.2.3"`, with any
    /// surrounding whitespace.
    pub fn from_response_body(body: &str) -> Result<Self, VersionError> {
        let trimmed = body.trim().trim_matches('"').trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        Self::parse(trimmed).map_err(|e| VersionError {
            input: body.to_string(),
            reason: e.reason,
        })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (&self.0, &other.0);
        (a.major, a.minor, a.patch)
            .cmp(&(b.major, b.minor, b.patch))
            .then_with(|| a.pre.cmp(&b.pre))
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl Default for SemanticVersion {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SemanticVersion {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SemanticVersion> for String {
    fn from(value: SemanticVersion) -> Self {
        value.to_string()
    }
}
