//! CLI command definitions and execution
//!
//! Every command resolves its settings through [`Context`] and drives the
//! core explorer types; no listing or download logic lives here.

use clap::{Parser, Subcommand};

use bx_core::ConfigManager;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod browse;
mod buckets;
mod config;
mod context;
mod get;
mod ls;
mod profiles;
mod share;

pub use context::Context;

/// bx - incremental S3 bucket explorer
///
/// Browse buckets folder by folder, with client-side search, sorting and
/// pagination, and download objects or whole folders.
#[derive(Parser, Debug)]
#[command(name = "bx")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// AWS profile (overrides the configured default)
    #[arg(long, global = true, env = "BX_PROFILE")]
    pub profile: Option<String>,

    /// AWS region (overrides the configured default)
    #[arg(long, global = true, env = "BX_REGION")]
    pub region: Option<String>,

    /// Endpoint of an S3-compatible service
    #[arg(long, global = true, env = "BX_ENDPOINT_URL")]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List AWS profiles from the shared credentials and config files
    Profiles,

    /// List buckets
    Buckets(buckets::BucketsArgs),

    /// List one folder of a bucket
    Ls(ls::LsArgs),

    /// Download an object or a folder
    Get(get::GetArgs),

    /// Print a time-limited download URL for an object
    Share(share::ShareArgs),

    /// Interactive folder browser
    Browse(browse::BrowseArgs),

    /// Show or change persisted settings
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let bootstrap = Formatter::new(OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        ..Default::default()
    });

    let manager = match ConfigManager::new() {
        Ok(m) => m,
        Err(e) => return context::report(&bootstrap, "Failed to locate config", &e),
    };
    let config = match manager.load() {
        Ok(c) => c,
        Err(e) => return context::report(&bootstrap, "Failed to load config", &e),
    };

    let output_config = OutputConfig {
        json: cli.json || config.defaults.output == "json",
        no_color: cli.no_color || config.defaults.color == "never",
        no_progress: cli.no_progress || !config.defaults.progress,
        quiet: cli.quiet,
    };
    let ctx = Context::new(manager, config, cli.profile, cli.region, cli.endpoint);

    match cli.command {
        Commands::Profiles => profiles::execute(&ctx, output_config),
        Commands::Buckets(args) => buckets::execute(args, &ctx, output_config).await,
        Commands::Ls(args) => ls::execute(args, &ctx, output_config).await,
        Commands::Get(args) => get::execute(args, &ctx, output_config).await,
        Commands::Share(args) => share::execute(args, &ctx, output_config).await,
        Commands::Browse(args) => browse::execute(args, &ctx, output_config).await,
        Commands::Config(cmd) => config::execute(cmd, &ctx, output_config),
    }
}
