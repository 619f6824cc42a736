//! Shell completions command

use clap::CommandFactory;

use bundle_updater::error::Result;

use crate::cli::{Cli, CompletionsArgs};

/// Generate shell completions
pub fn run(args: &CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(
        args.shell,
        &mut cmd,
        "bundle-updater",
        &mut std::io::stdout().lock(),
    );
    Ok(())
}
