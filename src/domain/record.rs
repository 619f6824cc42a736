//! The persisted record of the active bundle

use serde::{Deserialize, Serialize};

use super::location::Location;
use super::version::BundleVersion;

/// The bundle currently recorded as active.
///
/// Exactly one record is authoritative at a time; it is only replaced after an
/// install has been promoted and committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleRecord {
    pub version: BundleVersion,
    pub path: Location,
}

impl BundleRecord {
    pub fn new(version: impl Into<BundleVersion>, path: Location) -> Self {
        Self {
            version: version.into(),
            path,
        }
    }
}
