//! HTTP client for the update service
//!
//! Two calls: a version check (`POST check_url`) and an archive download
//! (`GET rn_zip_url`). Both are bounded by timeouts from configuration and
//! report failures as [`UpdaterError`](crate::error::UpdaterError) variants;
//! nothing here retries.

pub mod download;
pub mod wire;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub use download::{DOWNLOAD_PREFIX, DownloadedArchive, ProgressCallback};
pub use wire::{CheckRequest, RemoteUpdateInfo};

use crate::config::UpdaterConfig;
use crate::domain::{BundleVersion, VersionComparator};
use crate::error::{self, Result};

/// Result of a version check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    UpdateAvailable(RemoteUpdateInfo),
    NoUpdate,
}

#[derive(Debug, Clone)]
pub struct UpdateClient {
    http: reqwest::Client,
    check_url: String,
    platform: String,
    native_version: String,
    comparator: Arc<dyn VersionComparator>,
    check_timeout: Duration,
    download_timeout: Duration,
}

impl UpdateClient {
    pub fn from_config(config: &UpdaterConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bundle-updater/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.check_timeout())
            .build()
            .map_err(|e| error::network_failed(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            check_url: config.check_url.clone(),
            platform: config.platform.clone(),
            native_version: config.native_version.clone(),
            comparator: config.version_ordering.comparator(),
            check_timeout: config.check_timeout(),
            download_timeout: config.download_timeout(),
        })
    }

    /// Ask the update service whether a bundle newer than `current` exists
    pub async fn check_remote(&self, current: &BundleVersion) -> Result<CheckOutcome> {
        let info = tokio::time::timeout(self.check_timeout, self.fetch_update_info())
            .await
            .map_err(|_| {
                error::network_failed(format!(
                    "update check timed out after {:?}",
                    self.check_timeout
                ))
            })??;

        if self.comparator.is_newer(&info.version, current) {
            tracing::info!(current = %current, remote = %info.version, "update available");
            Ok(CheckOutcome::UpdateAvailable(info))
        } else {
            tracing::info!(current = %current, remote = %info.version, "bundle is up to date");
            Ok(CheckOutcome::NoUpdate)
        }
    }

    async fn fetch_update_info(&self) -> Result<RemoteUpdateInfo> {
        tracing::debug!(url = %self.check_url, platform = %self.platform, "checking for updates");

        let response = self
            .http
            .post(&self.check_url)
            .json(&CheckRequest {
                platform: &self.platform,
                native_version: &self.native_version,
            })
            .send()
            .await
            .map_err(|e| error::network_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(error::server_error(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| error::network_failed(format!("error reading response: {e}")))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(error::no_data(&self.check_url));
        }

        let info: RemoteUpdateInfo =
            serde_json::from_slice(&body).map_err(|e| error::decode_failed(e.to_string()))?;

        info.version.check_path_safe().map_err(error::decode_failed)?;

        Ok(info)
    }

    /// Stream `url` into a temp file inside `dest_dir`.
    ///
    /// The file is named `download-*_tmp`, so an interrupted download is swept
    /// with the other transient entries at the next startup.
    pub async fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        progress: Option<&ProgressCallback>,
    ) -> Result<DownloadedArchive> {
        download::download(&self.http, url, dest_dir, self.download_timeout, progress).await
    }
}
