//! Check command: ask the update service without installing anything

use console::Style;

use bundle_updater::client::{CheckOutcome, UpdateClient};
use bundle_updater::config::UpdaterConfig;
use bundle_updater::error::Result;
use bundle_updater::resolver::BundleResolver;

/// Compare the current baseline against the service. Unlike `run`, failures
/// are reported as errors.
pub async fn run(config: &UpdaterConfig) -> Result<()> {
    config.validate()?;
    let current = BundleResolver::from_config(config)?.peek_baseline();
    let client = UpdateClient::from_config(config)?;

    match client.check_remote(&current.version).await? {
        CheckOutcome::UpdateAvailable(info) => {
            println!(
                "{} {} -> {}",
                Style::new().green().bold().apply_to("Update available:"),
                current.version,
                Style::new().green().apply_to(&info.version)
            );
            println!("  {} {}", Style::new().bold().apply_to("Archive:"), info.archive_url);
            println!("  {} {}", Style::new().bold().apply_to("Checksum:"), info.checksum);
        }
        CheckOutcome::NoUpdate => {
            println!("Up to date ({})", current.version);
        }
    }
    Ok(())
}
