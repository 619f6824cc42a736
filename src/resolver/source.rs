//! Baseline sources in the fallback chain

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a baseline bundle may come from, in configurable priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSource {
    /// The persisted record, if its bundle file is still on disk
    InstalledVersion,
    /// The bundle shipped inside the host package
    ShippedDefault,
    /// A local development server
    DevelopmentServer,
}

impl BaselineSource {
    pub fn default_priority() -> Vec<Self> {
        vec![
            BaselineSource::InstalledVersion,
            BaselineSource::ShippedDefault,
            BaselineSource::DevelopmentServer,
        ]
    }

    /// Sources that can always synthesize a record from configuration
    pub fn is_fallback(self) -> bool {
        !matches!(self, BaselineSource::InstalledVersion)
    }
}

impl fmt::Display for BaselineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BaselineSource::InstalledVersion => "installed_version",
            BaselineSource::ShippedDefault => "shipped_default",
            BaselineSource::DevelopmentServer => "development_server",
        };
        f.write_str(name)
    }
}
