//! Staging directory guard
//!
//! A [`StagingDir`] owns `<install_root>/<version>_tmp` for the duration of an
//! install. Unless it is promoted, dropping the guard deletes the directory,
//! so early returns, panics and task cancellation all clean up after
//! themselves.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{BundleVersion, RETIRED_SUFFIX, STAGING_SUFFIX};
use crate::error::{self, Result};

#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
    promoted: bool,
}

impl StagingDir {
    /// (Re)create the staging directory for `version`.
    ///
    /// A leftover from an earlier interrupted install is removed first.
    pub fn create(install_root: &Path, version: &BundleVersion) -> Result<Self> {
        let path = install_root.join(format!("{version}{STAGING_SUFFIX}"));

        if path.exists() {
            fs::remove_dir_all(&path)
                .map_err(|e| error::file_operation(path.display().to_string(), e.to_string()))?;
        }
        fs::create_dir_all(&path)
            .map_err(|e| error::file_operation(path.display().to_string(), e.to_string()))?;

        Ok(Self {
            path,
            promoted: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically move the staged content to `target`.
    ///
    /// An existing `target` is renamed to `<target>_old` first and removed only
    /// after the staging rename succeeded. If that rename fails the old
    /// directory is put back and the staging directory is discarded.
    pub fn promote(mut self, target: &Path) -> Result<()> {
        let retired = retired_path(target);

        let moved_aside = if target.exists() {
            if retired.exists() {
                fs::remove_dir_all(&retired).map_err(|e| {
                    error::file_operation(retired.display().to_string(), e.to_string())
                })?;
            }
            fs::rename(target, &retired)
                .map_err(|e| error::file_operation(target.display().to_string(), e.to_string()))?;
            true
        } else {
            false
        };

        if let Err(e) = fs::rename(&self.path, target) {
            if moved_aside {
                if let Err(restore) = fs::rename(&retired, target) {
                    tracing::warn!(
                        path = %retired.display(),
                        error = %restore,
                        "failed to restore previous install"
                    );
                }
            }
            return Err(error::file_operation(
                target.display().to_string(),
                format!("failed to promote {}: {e}", self.path.display()),
            ));
        }

        self.promoted = true;

        if moved_aside {
            if let Err(e) = fs::remove_dir_all(&retired) {
                // Swept at the next startup
                tracing::warn!(path = %retired.display(), error = %e, "failed to remove retired install");
            }
        }

        Ok(())
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.promoted || !self.path.exists() {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove staging directory");
        }
    }
}

/// `<target>_old` next to `target`
fn retired_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(RETIRED_SUFFIX);
    target.with_file_name(name)
}
