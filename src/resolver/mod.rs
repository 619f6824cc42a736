//! Baseline bundle resolution
//!
//! Decides which bundle the host can load right now, before any network
//! activity. The persisted record wins when its bundle file is on disk;
//! otherwise the configured priority list is walked:
//!
//! ```text
//! installed_version -> shipped_default -> development_server
//! ```
//!
//! Resolution never fails: when no source is available the last configured
//! fallback is returned anyway, so the host always has something to load.

pub mod source;
pub mod sweep;

use std::path::PathBuf;
use std::time::Duration;

pub use source::BaselineSource;
pub use sweep::{sweep_orphans, sweep_transient};

use crate::config::UpdaterConfig;
use crate::domain::{BundleRecord, BundleVersion, Location};
use crate::error::Result;
use crate::store::VersionStore;

#[derive(Debug, Clone)]
pub struct BundleResolver {
    store: VersionStore,
    install_root: PathBuf,
    default_version: BundleVersion,
    entry_file: String,
    shipped_asset: Option<String>,
    assets_dir: Option<PathBuf>,
    development_server: Option<String>,
    priority: Vec<BaselineSource>,
    orphan_max_age: Option<Duration>,
}

impl BundleResolver {
    pub fn from_config(config: &UpdaterConfig) -> Result<Self> {
        Ok(Self {
            store: VersionStore::new(config.record_path()?),
            install_root: config.install_root()?,
            default_version: config.default_version.clone(),
            entry_file: config.entry_file.clone(),
            shipped_asset: config.shipped_asset.clone(),
            assets_dir: config.assets_dir.clone(),
            development_server: config.development_server.clone(),
            priority: config.baseline_priority.clone(),
            orphan_max_age: config.orphan_max_age(),
        })
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    /// Sweep stale artifacts, then resolve the baseline.
    ///
    /// Must not run while an install is in flight: the sweep would remove its
    /// staging directory.
    pub fn resolve_baseline(&self) -> BundleRecord {
        self.sweep_transient();
        let record = self.peek_baseline();
        if let Some(max_age) = self.orphan_max_age {
            sweep_orphans(&self.install_root, &record, max_age);
        }
        record
    }

    /// Resolve the baseline without touching the disk
    pub fn peek_baseline(&self) -> BundleRecord {
        let stored = self.store.load();
        if let Some(stored) = stored
            .as_ref()
            .filter(|record| !record.path.installed_file_exists())
        {
            tracing::warn!(
                version = %stored.version,
                location = %stored.path,
                "recorded bundle is not loadable, falling back"
            );
        }

        for source in &self.priority {
            if let Some(record) = self.available(*source, stored.as_ref()) {
                tracing::debug!(source = %source, version = %record.version, location = %record.path, "baseline resolved");
                return record;
            }
        }

        let fallback = self
            .priority
            .iter()
            .rev()
            .find_map(|source| self.synthesize(*source))
            .unwrap_or_else(|| {
                let asset = self
                    .shipped_asset
                    .clone()
                    .unwrap_or_else(|| self.entry_file.clone());
                BundleRecord::new(self.default_version.clone(), Location::Shipped(asset))
            });

        tracing::warn!(location = %fallback.path, "no baseline source available, using last fallback");
        fallback
    }

    /// Remove transient entries and leftover record temp files
    pub fn sweep_transient(&self) -> usize {
        let removed = sweep_transient(&self.install_root) + self.store.sweep_leftovers();
        if removed > 0 {
            tracing::info!(removed, "removed stale update artifacts");
        }
        removed
    }

    /// Record for `source` if it is usable right now
    fn available(
        &self,
        source: BaselineSource,
        stored: Option<&BundleRecord>,
    ) -> Option<BundleRecord> {
        match source {
            BaselineSource::InstalledVersion => stored
                .filter(|record| record.path.installed_file_exists())
                .cloned(),
            BaselineSource::ShippedDefault => {
                let asset = self.shipped_asset.as_ref()?;
                let present = self
                    .assets_dir
                    .as_ref()
                    .is_none_or(|dir| dir.join(asset).is_file());
                present.then(|| self.synthesize(source)).flatten()
            }
            BaselineSource::DevelopmentServer => self.synthesize(source),
        }
    }

    /// Record for a fallback source, ignoring availability
    fn synthesize(&self, source: BaselineSource) -> Option<BundleRecord> {
        let location = match source {
            BaselineSource::InstalledVersion => return None,
            BaselineSource::ShippedDefault => Location::Shipped(self.shipped_asset.clone()?),
            BaselineSource::DevelopmentServer => {
                Location::DevelopmentServer(self.development_server.clone()?)
            }
        };
        Some(BundleRecord::new(self.default_version.clone(), location))
    }
}
