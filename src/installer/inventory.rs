//! Listing of installed version directories

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use walkdir::WalkDir;

use crate::domain::{RETIRED_SUFFIX, STAGING_SUFFIX};
use crate::error::{self, Result};

/// One directory under the install root
#[derive(Debug, Clone)]
pub struct InstalledBundle {
    /// Directory name, which is the version token
    pub version: String,
    pub path: PathBuf,
    /// Total size in bytes
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl InstalledBundle {
    /// Format size as human-readable string
    pub fn formatted_size(&self) -> String {
        format_size(self.size)
    }

    /// Time since the directory was last modified; `None` if unknown or in
    /// the future
    pub fn age(&self) -> Option<Duration> {
        self.modified?.elapsed().ok()
    }
}

pub fn format_size(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let size = bytes as f64;
    if size < 1024.0 {
        format!("{bytes} B")
    } else if size < 1024.0 * 1024.0 {
        format!("{:.1} KB", size / 1024.0)
    } else if size < 1024.0 * 1024.0 * 1024.0 {
        format!("{:.1} MB", size / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", size / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Coarse human-readable age, e.g. `3d ago`
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        0..60 => "just now".to_string(),
        60..3600 => format!("{}m ago", secs / 60),
        3600..86_400 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

/// True for names of staging, retired and temp download entries
pub fn is_transient_name(name: &str) -> bool {
    name.ends_with(STAGING_SUFFIX) || name.ends_with(RETIRED_SUFFIX)
}

/// List version directories under `install_root`, sorted by name.
/// Transient entries are skipped.
pub fn list_installed(install_root: &Path) -> Result<Vec<InstalledBundle>> {
    if !install_root.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(install_root)
        .map_err(|e| error::file_operation(install_root.display().to_string(), e.to_string()))?;

    let mut bundles = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            error::file_operation(install_root.display().to_string(), e.to_string())
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let version = entry.file_name().to_string_lossy().to_string();
        if is_transient_name(&version) {
            continue;
        }
        let modified = entry.metadata().and_then(|m| m.modified()).ok();
        bundles.push(InstalledBundle {
            version,
            size: dir_size(&path),
            path,
            modified,
        });
    }

    bundles.sort_by(|a, b| a.version.cmp(&b.version));
    Ok(bundles)
}

/// Total size of all files below `path`
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}
