//! bundle-updater - over-the-air bundle updater
//!
//! Command line driver for the updater library: runs the startup flow the
//! way a host would and inspects the on-disk state.

use clap::Parser;

mod cli;
mod commands;
mod progress;

use bundle_updater::error::Result;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    bundle_updater::logging::init(cli.verbose);

    if let Err(e) = dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Version => return commands::version::run(),
        Commands::Completions(args) => return commands::completions::run(args),
        _ => {}
    }

    let config = commands::load_config(cli.config.as_deref(), cli.data_dir)?;

    match cli.command {
        Commands::Run(args) => commands::run::run(config, &args).await,
        Commands::Resolve(args) => commands::resolve::run(&config, &args),
        Commands::Check => commands::check::run(&config).await,
        Commands::Status => commands::status::run(&config),
        Commands::Reset(args) => commands::reset::run(&config, &args),
        Commands::Version | Commands::Completions(_) => Ok(()),
    }
}
