//! Command implementations for the bundle-updater CLI

pub mod check;
pub mod completions;
pub mod reset;
pub mod resolve;
pub mod run;
pub mod status;
pub mod version;

use std::path::{Path, PathBuf};

use bundle_updater::config::{DEFAULT_CONFIG_FILE, UpdaterConfig};
use bundle_updater::error::Result;

/// Load the configuration for a command.
///
/// An explicit `--config` must exist; otherwise `./bundle-updater.yaml` is
/// used when present, falling back to defaults. `--data-dir` wins over the
/// file's `data_dir`.
pub fn load_config(config: Option<&Path>, data_dir: Option<PathBuf>) -> Result<UpdaterConfig> {
    let mut loaded = match config {
        Some(path) => UpdaterConfig::load(path)?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                UpdaterConfig::load(default)?
            } else {
                UpdaterConfig::default()
            }
        }
    };

    if data_dir.is_some() {
        loaded.data_dir = data_dir;
    }
    Ok(loaded)
}
