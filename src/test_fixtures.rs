//! Test fixtures shared by unit tests.
//!
//! ```ignore
//! use crate::test_fixtures::{create_temp_dir, test_config, write_zip};
//!
//! let temp = create_temp_dir();
//! let config = test_config(&temp);
//! write_zip(&temp.path().join("update.zip"), &[("index.bundle", b"code")]);
//! ```

use std::io::Write;
use std::path::Path;

use tempfile::TempDir;
use zip::write::FileOptions;

use crate::config::UpdaterConfig;

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Configuration rooted in `temp` with no shipped asset directory check and
/// a check URL that is never contacted unless a test overrides it.
#[must_use]
pub fn test_config(temp: &TempDir) -> UpdaterConfig {
    UpdaterConfig {
        data_dir: Some(temp.path().join("data")),
        check_url: "http://127.0.0.1:9/api/hotupdate".to_string(),
        native_version: "1.0.0".to_string(),
        platform: "android".to_string(),
        ..UpdaterConfig::default()
    }
}

/// Write a deflated ZIP archive holding `entries` (name, content).
///
/// # Panics
///
/// Panics if the archive cannot be written.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).expect("Failed to create archive");
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in entries {
        zip.start_file(*name, options)
            .expect("Failed to start zip entry");
        zip.write_all(content).expect("Failed to write zip entry");
    }

    zip.finish().expect("Failed to finish archive");
}
