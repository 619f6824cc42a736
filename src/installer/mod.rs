//! Archive installation
//!
//! Turns a verified archive into a version directory under the install root:
//!
//! 1. Stage: extract into `<version>_tmp`
//! 2. Validate: the entry file must exist in the staged tree
//! 3. Promote: rename the staging directory to `<version>`
//! 4. Return the location of the entry file
//!
//! The persisted record is not touched here; committing is the caller's job.

pub mod extract;
pub mod inventory;
pub mod staging;

use std::fs;
use std::path::{Path, PathBuf};

pub use extract::extract_zip;
pub use inventory::{
    InstalledBundle, format_age, format_size, is_transient_name, list_installed,
};
pub use staging::StagingDir;

use crate::domain::{BundleVersion, Location};
use crate::error::{self, Result};

#[derive(Debug, Clone)]
pub struct ArchiveInstaller {
    install_root: PathBuf,
    entry_file: String,
}

impl ArchiveInstaller {
    pub fn new(install_root: impl Into<PathBuf>, entry_file: impl Into<String>) -> Self {
        Self {
            install_root: install_root.into(),
            entry_file: entry_file.into(),
        }
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn entry_file(&self) -> &str {
        &self.entry_file
    }

    /// Directory an install of `version` is promoted to
    pub fn version_dir(&self, version: &BundleVersion) -> PathBuf {
        self.install_root.join(version.as_str())
    }

    pub fn install_archive(&self, archive: &Path, version: &BundleVersion) -> Result<Location> {
        version.check_path_safe().map_err(|reason| {
            error::file_operation(self.version_dir(version).display().to_string(), reason)
        })?;

        fs::create_dir_all(&self.install_root).map_err(|e| {
            error::file_operation(self.install_root.display().to_string(), e.to_string())
        })?;

        let staging = StagingDir::create(&self.install_root, version)?;
        extract_zip(archive, staging.path())?;

        if !staging.path().join(&self.entry_file).is_file() {
            return Err(error::missing_entry(
                &self.entry_file,
                staging.path().display().to_string(),
            ));
        }

        let target = self.version_dir(version);
        staging.promote(&target)?;

        tracing::info!(version = %version, path = %target.display(), "bundle installed");
        Ok(Location::Installed(target.join(&self.entry_file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpdaterError;
    use crate::test_fixtures::write_zip;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ArchiveInstaller) {
        let temp = TempDir::new().unwrap();
        let installer = ArchiveInstaller::new(temp.path().join("bundles"), "index.bundle");
        (temp, installer)
    }

    fn entries_of(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_install_returns_entry_location() {
        let (temp, installer) = setup();
        let archive = temp.path().join("update.zip");
        write_zip(&archive, &[("index.bundle", b"v2".as_slice())]);

        let location = installer
            .install_archive(&archive, &BundleVersion::from("1.1.0"))
            .unwrap();

        let expected = temp.path().join("bundles/1.1.0/index.bundle");
        assert_eq!(location, Location::Installed(expected.clone()));
        assert_eq!(fs::read(expected).unwrap(), b"v2");
        assert_eq!(entries_of(installer.install_root()), vec!["1.1.0"]);
    }

    #[test]
    fn test_missing_entry_leaves_no_directories() {
        let (temp, installer) = setup();
        let archive = temp.path().join("update.zip");
        write_zip(&archive, &[("other.bundle", b"v2".as_slice())]);

        let err = installer
            .install_archive(&archive, &BundleVersion::from("1.1.0"))
            .unwrap_err();

        assert!(matches!(err, UpdaterError::MissingEntry { .. }));
        assert!(entries_of(installer.install_root()).is_empty());
    }

    #[test]
    fn test_corrupt_archive_leaves_no_directories() {
        let (temp, installer) = setup();
        let archive = temp.path().join("update.zip");
        fs::write(&archive, b"PK\x03\x04 truncated").unwrap();

        let err = installer
            .install_archive(&archive, &BundleVersion::from("1.1.0"))
            .unwrap_err();

        assert!(matches!(err, UpdaterError::Unzip { .. }));
        assert!(entries_of(installer.install_root()).is_empty());
    }

    #[test]
    fn test_reinstall_same_version_replaces_content() {
        let (temp, installer) = setup();
        let version = BundleVersion::from("1.1.0");

        let first = temp.path().join("first.zip");
        write_zip(&first, &[("index.bundle", b"first".as_slice())]);
        installer.install_archive(&first, &version).unwrap();

        let second = temp.path().join("second.zip");
        write_zip(&second, &[("index.bundle", b"second".as_slice())]);
        let location = installer.install_archive(&second, &version).unwrap();

        assert_eq!(fs::read(location.as_path().unwrap()).unwrap(), b"second");
        assert_eq!(entries_of(installer.install_root()), vec!["1.1.0"]);
    }

    #[test]
    fn test_failed_install_keeps_existing_version() {
        let (temp, installer) = setup();
        let version = BundleVersion::from("1.1.0");

        let good = temp.path().join("good.zip");
        write_zip(&good, &[("index.bundle", b"good".as_slice())]);
        installer.install_archive(&good, &version).unwrap();

        let bad = temp.path().join("bad.zip");
        write_zip(&bad, &[("readme.txt", b"nope".as_slice())]);
        assert!(installer.install_archive(&bad, &version).is_err());

        assert_eq!(
            fs::read(temp.path().join("bundles/1.1.0/index.bundle")).unwrap(),
            b"good"
        );
    }

    #[test]
    fn test_rejects_unsafe_version() {
        let (temp, installer) = setup();
        let archive = temp.path().join("update.zip");
        write_zip(&archive, &[("index.bundle", b"v2".as_slice())]);

        let err = installer
            .install_archive(&archive, &BundleVersion::from("../escape"))
            .unwrap_err();

        assert!(matches!(err, UpdaterError::FileOperation { .. }));
        assert!(!temp.path().join("escape").exists());
    }
}
