//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bundle-updater - over-the-air bundle updater
///
/// Resolve, check and install versioned payload bundles for a host application.
#[derive(Parser, Debug)]
#[command(
    name = "bundle-updater",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Over-the-air bundle updater",
    long_about = "Resolves which bundle a host application should load, checks an update \
                  service for a newer one, and installs it atomically without ever leaving \
                  the host without a loadable bundle.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  bundle-updater run\n    \
                  bundle-updater resolve\n    \
                  bundle-updater check --config ./bundle-updater.yaml\n    \
                  bundle-updater status\n    \
                  bundle-updater reset"
)]
pub struct Cli {
    /// Configuration file (defaults to ./bundle-updater.yaml when present)
    #[arg(long, short = 'c', global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Data directory holding the record and installed bundles
    #[arg(long, global = true, env = "BUNDLE_UPDATER_HOME", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full startup flow: resolve, check, download, verify, install
    Run(RunArgs),

    /// Resolve the baseline bundle without contacting the update service
    Resolve(ResolveArgs),

    /// Ask the update service whether a newer bundle exists
    Check,

    /// Show the active record and installed bundles
    Status,

    /// Forget the active record so the next start uses the fallback chain
    Reset(ResetArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Run the startup flow:\n    bundle-updater run\n\n\
                  Print the report as JSON:\n    bundle-updater run --json")]
pub struct RunArgs {
    /// Print the startup report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Resolve and clean up stale artifacts:\n    bundle-updater resolve\n\n\
                  Resolve without touching the disk:\n    bundle-updater resolve --no-sweep")]
pub struct ResolveArgs {
    /// Do not remove stale staging directories and orphaned installs
    #[arg(long)]
    pub no_sweep: bool,
}

/// Arguments for the reset command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Forget the active record:\n    bundle-updater reset\n\n\
                  Also delete installed bundles:\n    bundle-updater reset --purge")]
pub struct ResetArgs {
    /// Also delete every installed bundle directory
    #[arg(long)]
    pub purge: bool,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    bundle-updater completions --shell bash > ~/.bash_completion.d/bundle-updater\n\n\
                  Generate zsh completions:\n    bundle-updater completions --shell zsh > ~/.zfunc/_bundle-updater")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(long, value_enum)]
    pub shell: clap_complete::Shell,
}
