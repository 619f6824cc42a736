//! Common test utilities for bundle-updater integration tests

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use bundle_updater::config::UpdaterConfig;
use bundle_updater::domain::{BundleRecord, Location};
use bundle_updater::store::VersionStore;
use md5::{Digest, Md5};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the mock update service answers version checks on
pub const CHECK_PATH: &str = "/api/hotupdate";

/// An isolated data directory plus the configuration pointing at it
pub struct TestEnv {
    pub temp: TempDir,
    pub data_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let data_dir = temp.path().join("data");
        Self { temp, data_dir }
    }

    /// Configuration checking `server` for updates
    pub fn config(&self, server: &MockServer) -> UpdaterConfig {
        UpdaterConfig {
            data_dir: Some(self.data_dir.clone()),
            check_url: format!("{}{CHECK_PATH}", server.uri()),
            platform: "android".to_string(),
            native_version: "1.0.0".to_string(),
            check_timeout_secs: 5,
            download_timeout_secs: 5,
            ..UpdaterConfig::default()
        }
    }

    /// Configuration that never reaches a server
    pub fn offline_config(&self) -> UpdaterConfig {
        UpdaterConfig {
            data_dir: Some(self.data_dir.clone()),
            check_url: "http://127.0.0.1:9/api/hotupdate".to_string(),
            enabled: false,
            ..UpdaterConfig::default()
        }
    }

    pub fn install_root(&self) -> PathBuf {
        self.data_dir.join("bundles")
    }

    pub fn store(&self) -> VersionStore {
        VersionStore::new(self.data_dir.join("bundle-record.json"))
    }

    /// Lay out an installed version and record it as active
    pub fn install_active(&self, version: &str, content: &str) -> BundleRecord {
        let dir = self.install_root().join(version);
        std::fs::create_dir_all(&dir).expect("Failed to create version directory");
        let entry = dir.join("index.bundle");
        std::fs::write(&entry, content).expect("Failed to write bundle");

        let record = BundleRecord::new(version, Location::Installed(entry));
        self.store().save(&record).expect("Failed to save record");
        record
    }

    /// Sorted names of the entries under the install root
    pub fn install_root_entries(&self) -> Vec<String> {
        dir_entries(&self.install_root())
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorted entry names of `dir`; empty when it does not exist
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<_> = entries
        .map(|e| {
            e.expect("Failed to read entry")
                .file_name()
                .to_string_lossy()
                .to_string()
        })
        .collect();
    names.sort();
    names
}

/// Build a ZIP archive in memory
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in entries {
        zip.start_file(*name, options)
            .expect("Failed to start zip entry");
        zip.write_all(content).expect("Failed to write zip entry");
    }
    zip.finish().expect("Failed to finish archive").into_inner()
}

pub fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// Mount a check response advertising `version` at `/bundles/<version>.zip`
pub async fn mount_check(server: &MockServer, version: &str, checksum: &str) {
    Mock::given(method("POST"))
        .and(path(CHECK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rn_version": version,
            "rn_zip_url": format!("{}/bundles/{version}.zip", server.uri()),
            "checksum": checksum,
        })))
        .mount(server)
        .await;
}

/// Mount the archive download for `version`
pub async fn mount_archive(server: &MockServer, version: &str, archive: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!("/bundles/{version}.zip")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .mount(server)
        .await;
}

/// Mount a complete, valid update to `version` whose bundle holds `content`
pub async fn mount_update(server: &MockServer, version: &str, content: &[u8]) {
    let archive = zip_bytes(&[("index.bundle", content)]);
    mount_check(server, version, &md5_hex(&archive)).await;
    mount_archive(server, version, archive).await;
}
