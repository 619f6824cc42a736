//! Removal of stale artifacts under the install root
//!
//! Two passes: transient entries (`*_tmp`, `*_old`, interrupted downloads)
//! are always removed; version directories no longer referenced by the
//! active record are removed once they are older than the configured age.
//! Failures are logged and skipped.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::domain::BundleRecord;
use crate::installer::is_transient_name;

/// Remove every transient entry directly under `install_root`
pub fn sweep_transient(install_root: &Path) -> usize {
    let Ok(entries) = fs::read_dir(install_root) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.filter_map(std::result::Result::ok) {
        let name = entry.file_name();
        if !is_transient_name(&name.to_string_lossy()) {
            continue;
        }

        let path = entry.path();
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };

        match result {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "removed transient entry");
                removed += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove transient entry");
            }
        }
    }
    removed
}

/// Remove version directories not referenced by `active` and last modified
/// more than `max_age` ago
pub fn sweep_orphans(install_root: &Path, active: &BundleRecord, max_age: Duration) -> usize {
    let Ok(entries) = fs::read_dir(install_root) else {
        return 0;
    };

    let active_path = active.path.as_path();
    let now = SystemTime::now();

    let mut removed = 0;
    for entry in entries.filter_map(std::result::Result::ok) {
        let path = entry.path();
        if !path.is_dir() || is_transient_name(&entry.file_name().to_string_lossy()) {
            continue;
        }
        if active_path.is_some_and(|p| p.starts_with(&path)) {
            continue;
        }

        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        if age.is_none_or(|age| age < max_age) {
            continue;
        }

        match fs::remove_dir_all(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed orphaned bundle directory");
                removed += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove orphaned bundle directory");
            }
        }
    }
    removed
}
