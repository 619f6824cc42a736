//! Run command: the full startup flow

use console::Style;

use bundle_updater::config::UpdaterConfig;
use bundle_updater::error::Result;
use bundle_updater::manager::{FlowOutcome, UpdateManager};

use crate::cli::RunArgs;
use crate::progress::DownloadProgress;

/// Run the startup flow and print what the host should load.
///
/// The flow itself never fails; only an unusable configuration is an error.
pub async fn run(config: UpdaterConfig, args: &RunArgs) -> Result<()> {
    let progress = DownloadProgress::new();
    let manager = UpdateManager::new(config)?.with_progress(progress.callback());

    let report = manager.run_startup_flow_report().await;
    progress.finish();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let outcome_style = match report.outcome {
        FlowOutcome::Updated { .. } => Style::new().green().bold(),
        FlowOutcome::Failed { .. } => Style::new().yellow().bold(),
        _ => Style::new().bold(),
    };

    println!(
        "{} {}",
        Style::new().bold().apply_to("Outcome:"),
        outcome_style.apply_to(&report.outcome)
    );
    println!(
        "{} {}",
        Style::new().bold().apply_to("Version:"),
        report.record.version
    );
    println!(
        "{} {}",
        Style::new().bold().apply_to("Load:"),
        Style::new().cyan().apply_to(&report.location)
    );

    Ok(())
}
