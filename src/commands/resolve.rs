//! Resolve command: baseline resolution only

use console::Style;

use bundle_updater::config::UpdaterConfig;
use bundle_updater::error::Result;
use bundle_updater::resolver::BundleResolver;

use crate::cli::ResolveArgs;

pub fn run(config: &UpdaterConfig, args: &ResolveArgs) -> Result<()> {
    config.validate()?;
    let resolver = BundleResolver::from_config(config)?;

    let record = if args.no_sweep {
        resolver.peek_baseline()
    } else {
        resolver.resolve_baseline()
    };

    println!("{} {}", Style::new().bold().apply_to("Version:"), record.version);
    println!(
        "{} {}",
        Style::new().bold().apply_to("Load:"),
        Style::new().cyan().apply_to(&record.path)
    );
    Ok(())
}
