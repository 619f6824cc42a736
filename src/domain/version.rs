//! Bundle version tokens and pluggable ordering strategies

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Suffix of staging directories holding an in-progress extraction
pub const STAGING_SUFFIX: &str = "_tmp";

/// Suffix of a previous install moved aside during promotion
pub const RETIRED_SUFFIX: &str = "_old";

/// Longest version token accepted as a directory name
const MAX_VERSION_LEN: usize = 128;

/// An opaque version token as published by the update service.
///
/// Ordering is not defined on the token itself; it is delegated to a
/// [`VersionComparator`] chosen by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundleVersion(String);

impl BundleVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check that the token can be used as a single directory name under the
    /// install root without escaping it or colliding with transient entries.
    pub fn check_path_safe(&self) -> std::result::Result<(), String> {
        let v = self.0.as_str();
        if v.is_empty() {
            return Err("version is empty".to_string());
        }
        if v.len() > MAX_VERSION_LEN {
            return Err(format!("version longer than {MAX_VERSION_LEN} bytes"));
        }
        if v.starts_with('.') {
            return Err(format!("version '{v}' starts with '.'"));
        }
        if let Some(c) = v
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+')))
        {
            return Err(format!("version '{v}' contains invalid character '{c}'"));
        }
        if v.ends_with(STAGING_SUFFIX) || v.ends_with(RETIRED_SUFFIX) {
            return Err(format!("version '{v}' ends with a reserved suffix"));
        }
        Ok(())
    }
}

impl fmt::Display for BundleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BundleVersion {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BundleVersion {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Strategy deciding whether a remote version supersedes the current one
pub trait VersionComparator: fmt::Debug + Send + Sync {
    fn compare(&self, a: &BundleVersion, b: &BundleVersion) -> Ordering;

    /// True when `candidate` is strictly greater than `current`
    fn is_newer(&self, candidate: &BundleVersion, current: &BundleVersion) -> bool {
        self.compare(candidate, current) == Ordering::Greater
    }
}

/// Plain string ordering.
///
/// Only correct for versions that sort the same lexicographically and
/// numerically (zero padded); "1.10.0" sorts before "1.9.0".
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicographicComparator;

impl VersionComparator for LexicographicComparator {
    fn compare(&self, a: &BundleVersion, b: &BundleVersion) -> Ordering {
        a.as_str().cmp(b.as_str())
    }
}

/// Numeric ordering: semver when both sides parse, otherwise dotted numeric
/// segments with zero padding, otherwise plain string ordering.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticComparator;

impl SemanticComparator {
    fn parse_semver(v: &str) -> Option<semver::Version> {
        semver::Version::parse(v.trim_start_matches('v')).ok()
    }

    fn parse_dotted(v: &str) -> Option<Vec<u64>> {
        v.trim_start_matches('v')
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect()
    }

    fn compare_dotted(a: &[u64], b: &[u64]) -> Ordering {
        let len = a.len().max(b.len());
        (0..len)
            .map(|i| {
                let x = a.get(i).copied().unwrap_or(0);
                let y = b.get(i).copied().unwrap_or(0);
                x.cmp(&y)
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl VersionComparator for SemanticComparator {
    fn compare(&self, a: &BundleVersion, b: &BundleVersion) -> Ordering {
        if let (Some(x), Some(y)) = (
            Self::parse_semver(a.as_str()),
            Self::parse_semver(b.as_str()),
        ) {
            return x.cmp(&y);
        }
        if let (Some(x), Some(y)) = (
            Self::parse_dotted(a.as_str()),
            Self::parse_dotted(b.as_str()),
        ) {
            return Self::compare_dotted(&x, &y);
        }
        tracing::debug!(a = %a, b = %b, "versions are not numeric, comparing as strings");
        a.as_str().cmp(b.as_str())
    }
}

/// Configurable choice of comparator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionOrdering {
    #[default]
    Lexicographic,
    Semantic,
}

impl VersionOrdering {
    pub fn comparator(self) -> Arc<dyn VersionComparator> {
        match self {
            VersionOrdering::Lexicographic => Arc::new(LexicographicComparator),
            VersionOrdering::Semantic => Arc::new(SemanticComparator),
        }
    }
}
