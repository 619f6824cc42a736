//! Status command: active record and installed bundles

use console::Style;

use bundle_updater::config::UpdaterConfig;
use bundle_updater::error::Result;
use bundle_updater::installer::{format_age, format_size, list_installed};
use bundle_updater::store::VersionStore;

pub fn run(config: &UpdaterConfig) -> Result<()> {
    let store = VersionStore::new(config.record_path()?);
    let install_root = config.install_root()?;
    let record = store.load();

    println!(
        "{} {}",
        Style::new().bold().apply_to("Data directory:"),
        config.data_dir()?.display()
    );

    match &record {
        Some(record) => {
            let loadable = !record.path.is_installed() || record.path.installed_file_exists();
            println!(
                "{} {} ({})",
                Style::new().bold().apply_to("Active:"),
                Style::new().bold().yellow().apply_to(&record.version),
                Style::new().cyan().apply_to(&record.path)
            );
            if !loadable {
                println!(
                    "  {}",
                    Style::new()
                        .red()
                        .apply_to("bundle file is missing; the fallback chain will be used")
                );
            }
        }
        None => println!(
            "{} none (fallback chain in use)",
            Style::new().bold().apply_to("Active:")
        ),
    }

    let installed = list_installed(&install_root)?;
    if installed.is_empty() {
        println!("No bundles installed.");
        return Ok(());
    }

    let total: u64 = installed.iter().map(|b| b.size).sum();
    println!();
    println!(
        "Installed bundles ({}, {}):",
        installed.len(),
        format_size(total)
    );
    for bundle in &installed {
        let active = record
            .as_ref()
            .and_then(|r| r.path.as_path())
            .is_some_and(|p| p.starts_with(&bundle.path));
        let marker = if active { "*" } else { " " };
        let age = bundle
            .age()
            .map_or_else(|| "unknown age".to_string(), format_age);
        println!(
            "  {} {} {} {}",
            Style::new().green().apply_to(marker),
            Style::new().bold().apply_to(&bundle.version),
            Style::new().dim().apply_to(bundle.formatted_size()),
            Style::new().dim().apply_to(format!("(installed {age})"))
        );
    }

    Ok(())
}
