//! Persistence of the active bundle record
//!
//! The record is a small JSON file (`{"version": ..., "path": ...}`). Writes go
//! through a temp file in the same directory followed by a rename, so readers
//! see either the previous record or the new one and never a torn write.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::BundleRecord;
use crate::error::{self, Result};

/// Prefix of temp files created while saving the record
const TEMP_PREFIX: &str = ".bundle-record-";

/// Suffix shared with every other transient artifact
const TEMP_SUFFIX: &str = "_tmp";

/// Exclusive owner of the persisted [`BundleRecord`]
#[derive(Debug, Clone)]
pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record.
    ///
    /// A missing file and a file that cannot be parsed both mean "no record";
    /// the caller falls back to the baseline chain.
    pub fn load(&self) -> Option<BundleRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read bundle record");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt bundle record");
                None
            }
        }
    }

    /// Atomically replace the record
    pub fn save(&self, record: &BundleRecord) -> Result<()> {
        let parent = self.parent_dir();
        fs::create_dir_all(parent)
            .map_err(|e| error::file_operation(parent.display().to_string(), e.to_string()))?;

        let content = serde_json::to_string_pretty(record)?;

        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(parent)
            .map_err(|e| error::file_operation(parent.display().to_string(), e.to_string()))?;

        temp.write_all(content.as_bytes())
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| error::file_operation(temp.path().display().to_string(), e.to_string()))?;

        temp.persist(&self.path).map_err(|e| {
            error::file_operation(self.path.display().to_string(), e.error.to_string())
        })?;

        tracing::debug!(
            path = %self.path.display(),
            version = %record.version,
            "bundle record saved"
        );
        Ok(())
    }

    /// Delete the record. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(error::file_operation(
                self.path.display().to_string(),
                e.to_string(),
            )),
        }
    }

    /// Remove temp files left behind by an interrupted [`save`](Self::save).
    /// Returns the number removed.
    pub fn sweep_leftovers(&self) -> usize {
        let Ok(entries) = fs::read_dir(self.parent_dir()) else {
            return 0;
        };

        let mut removed = 0;
        for entry in entries.filter_map(std::result::Result::ok) {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !(name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX)) {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(
                    path = %entry.path().display(),
                    error = %e,
                    "failed to remove leftover record temp file"
                ),
            }
        }
        removed
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}
