//! Streamed archive download into a temp file

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use crate::error::{self, Result};

/// Download progress callback: `(downloaded, total)`; `total` is `None` when
/// the server sends no content length.
pub type ProgressCallback = Arc<dyn Fn(u64, Option<u64>) + Send + Sync>;

/// Prefix of downloaded archive temp files
pub const DOWNLOAD_PREFIX: &str = "download-";

/// Shared transient suffix, swept at startup
const DOWNLOAD_SUFFIX: &str = "_tmp";

/// A fully downloaded archive. The file is deleted when this is dropped.
#[derive(Debug)]
pub struct DownloadedArchive {
    path: TempPath,
    bytes: u64,
}

impl DownloadedArchive {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

pub(super) async fn download(
    http: &reqwest::Client,
    url: &str,
    dest_dir: &Path,
    timeout: Duration,
    progress: Option<&ProgressCallback>,
) -> Result<DownloadedArchive> {
    let parsed = reqwest::Url::parse(url).map_err(|_| error::invalid_url(url))?;

    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| error::file_operation(dest_dir.display().to_string(), e.to_string()))?;

    let temp = tempfile::Builder::new()
        .prefix(DOWNLOAD_PREFIX)
        .suffix(DOWNLOAD_SUFFIX)
        .tempfile_in(dest_dir)
        .map_err(|e| error::file_operation(dest_dir.display().to_string(), e.to_string()))?;
    let (file, path) = temp.into_parts();

    tracing::info!(url = %url, dest = %path.display(), "downloading bundle archive");

    // `path` is dropped on every early return, removing the partial file
    let bytes = tokio::time::timeout(
        timeout,
        stream_to_file(http, parsed, tokio::fs::File::from_std(file), progress),
    )
    .await
    .map_err(|_| error::network_failed(format!("download timed out after {timeout:?}")))??;

    tracing::info!(bytes, "download complete");
    Ok(DownloadedArchive { path, bytes })
}

async fn stream_to_file(
    http: &reqwest::Client,
    url: reqwest::Url,
    mut file: tokio::fs::File,
    progress: Option<&ProgressCallback>,
) -> Result<u64> {
    let response = http
        .get(url.clone())
        .send()
        .await
        .map_err(|e| error::network_failed(format!("download request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(error::server_error(status.as_u16()));
    }

    let total = response.content_length();
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| error::network_failed(format!("error reading body: {e}")))?;

        file.write_all(&chunk)
            .await
            .map_err(|e| error::file_operation("download temp file", e.to_string()))?;

        downloaded += chunk.len() as u64;
        if let Some(callback) = progress {
            callback(downloaded, total);
        }
    }

    file.flush()
        .await
        .map_err(|e| error::file_operation("download temp file", e.to_string()))?;
    file.sync_all()
        .await
        .map_err(|e| error::file_operation("download temp file", e.to_string()))?;

    if downloaded == 0 {
        return Err(error::no_data(url.as_str()));
    }

    if total.is_some_and(|expected| expected != downloaded) {
        tracing::warn!(expected = ?total, downloaded, "download size mismatch");
        return Err(error::network_failed(format!(
            "download incomplete: expected {} bytes, got {downloaded}",
            total.unwrap_or_default()
        )));
    }

    Ok(downloaded)
}
