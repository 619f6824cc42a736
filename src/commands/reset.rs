//! Reset command: forget the active record

use std::fs;

use bundle_updater::config::UpdaterConfig;
use bundle_updater::error::{self, Result};
use bundle_updater::store::VersionStore;

use crate::cli::ResetArgs;

pub fn run(config: &UpdaterConfig, args: &ResetArgs) -> Result<()> {
    let store = VersionStore::new(config.record_path()?);

    if store.clear()? {
        println!("Removed bundle record {}", store.path().display());
    } else {
        println!("No bundle record to remove.");
    }

    if args.purge {
        let install_root = config.install_root()?;
        if install_root.exists() {
            fs::remove_dir_all(&install_root).map_err(|e| {
                error::file_operation(install_root.display().to_string(), e.to_string())
            })?;
            println!("Removed installed bundles in {}", install_root.display());
        }
    }

    Ok(())
}
