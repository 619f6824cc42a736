//! Updater configuration (`bundle-updater.yaml`)
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration that checks `http://localhost:3000/api/hotupdate`.
//!
//! ```yaml
//! check_url: https://updates.example.com/api/hotupdate
//! native_version: 1.0.0
//! entry_file: index.android.bundle
//! shipped_asset: index.android.bundle
//! version_ordering: semantic
//! baseline_priority: [installed_version, shipped_default]
//! ```

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{BundleVersion, VersionOrdering};
use crate::error::{self, Result};
use crate::hash::DigestAlgorithm;
use crate::resolver::BaselineSource;

/// Environment variable overriding the data directory
pub const HOME_ENV: &str = "BUNDLE_UPDATER_HOME";

/// Configuration file looked up in the working directory by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "bundle-updater.yaml";

/// Directory name under the platform data directory
const DATA_DIR_NAME: &str = "bundle-updater";

/// Subdirectory of the data directory holding one directory per version
const INSTALL_DIR: &str = "bundles";

/// Persisted active-bundle record
const RECORD_FILE: &str = "bundle-record.json";

const DEFAULT_ORPHAN_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// When false the startup flow resolves the baseline and never checks
    pub enabled: bool,

    /// Endpoint receiving the version check POST
    pub check_url: String,

    /// Platform reported to the update service
    pub platform: String,

    /// Version of the host shell reported to the update service
    pub native_version: String,

    /// Root of all persisted state; see [`UpdaterConfig::data_dir`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Bundle file expected at the root of every archive
    pub entry_file: String,

    /// Version reported while running a fallback bundle
    pub default_version: BundleVersion,

    /// Asset name of the bundle shipped inside the host package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipped_asset: Option<String>,

    /// Directory holding shipped assets, used to check availability
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<PathBuf>,

    /// Development server URL used as the last-resort fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub development_server: Option<String>,

    pub baseline_priority: Vec<BaselineSource>,

    pub version_ordering: VersionOrdering,

    pub digest: DigestAlgorithm,

    pub check_timeout_secs: u64,

    pub download_timeout_secs: u64,

    /// Age after which unreferenced version directories are removed.
    /// `null` disables the sweep.
    pub orphan_max_age_secs: Option<u64>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_url: "http://localhost:3000/api/hotupdate".to_string(),
            platform: std::env::consts::OS.to_string(),
            native_version: "1.0.0".to_string(),
            data_dir: None,
            entry_file: "index.bundle".to_string(),
            default_version: BundleVersion::from("0.0.1"),
            shipped_asset: Some("index.bundle".to_string()),
            assets_dir: None,
            development_server: Some(
                "http://127.0.0.1:8081/index.bundle?dev=true&minify=false".to_string(),
            ),
            baseline_priority: BaselineSource::default_priority(),
            version_ordering: VersionOrdering::default(),
            digest: DigestAlgorithm::default(),
            check_timeout_secs: 10,
            download_timeout_secs: 300,
            orphan_max_age_secs: Some(DEFAULT_ORPHAN_MAX_AGE_SECS),
        }
    }
}

impl UpdaterConfig {
    /// Parse configuration from a YAML string and validate it
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| error::config_read_failed(path.display().to_string(), e.to_string()))?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| error::config_parse_failed(path.display().to_string(), e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.check_url.trim().is_empty() {
            return Err(error::config_invalid("check_url must not be empty"));
        }
        reqwest::Url::parse(&self.check_url).map_err(|e| {
            error::config_invalid(format!("check_url '{}' is not a URL: {e}", self.check_url))
        })?;

        validate_entry_file(&self.entry_file)?;

        if let Some(url) = &self.development_server {
            reqwest::Url::parse(url).map_err(|e| {
                error::config_invalid(format!("development_server '{url}' is not a URL: {e}"))
            })?;
        }

        self.default_version
            .check_path_safe()
            .map_err(|reason| error::config_invalid(format!("default_version: {reason}")))?;

        if self.baseline_priority.is_empty() {
            return Err(error::config_invalid("baseline_priority must not be empty"));
        }

        if !self
            .baseline_priority
            .iter()
            .any(|source| source.is_fallback() && self.is_source_configured(*source))
        {
            return Err(error::config_invalid(
                "baseline_priority needs a configured shipped_default or development_server",
            ));
        }

        if self.check_timeout_secs == 0 || self.download_timeout_secs == 0 {
            return Err(error::config_invalid("timeouts must be greater than zero"));
        }

        Ok(())
    }

    /// Whether the configuration carries what `source` needs
    pub fn is_source_configured(&self, source: BaselineSource) -> bool {
        match source {
            BaselineSource::InstalledVersion => true,
            BaselineSource::ShippedDefault => self.shipped_asset.is_some(),
            BaselineSource::DevelopmentServer => self.development_server.is_some(),
        }
    }

    /// Root of all persisted state.
    ///
    /// Resolution order: `data_dir` from the file, `$BUNDLE_UPDATER_HOME`,
    /// then `bundle-updater` under the platform data directory.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var(HOME_ENV) {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }

        let base = dirs::data_local_dir()
            .ok_or_else(|| error::config_invalid("could not determine a data directory"))?;
        Ok(base.join(DATA_DIR_NAME))
    }

    /// Directory holding one directory per installed version
    pub fn install_root(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(INSTALL_DIR))
    }

    pub fn record_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(RECORD_FILE))
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn orphan_max_age(&self) -> Option<Duration> {
        self.orphan_max_age_secs.map(Duration::from_secs)
    }
}

/// The entry file must be a relative path that stays inside a version
/// directory.
fn validate_entry_file(entry: &str) -> Result<()> {
    if entry.trim().is_empty() {
        return Err(error::config_invalid("entry_file must not be empty"));
    }

    let escapes = Path::new(entry)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(error::config_invalid(format!(
            "entry_file '{entry}' must be a relative path inside the bundle"
        )));
    }

    Ok(())
}
