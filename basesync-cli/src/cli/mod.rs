//! Command-line interface

pub mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use commands::sync::{DiffArgs, SyncArgs, ValidateArgs};

#[derive(Parser, Debug)]
#[command(
    name = "basesync",
    author,
    version,
    about = "Bring Airtable bases in line with a JSON schema definition"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to a TOML config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Airtable personal access token (overrides AIRTABLE_API_KEY)
    #[arg(long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or update a base so it contains every table and field of a schema file
    Sync(SyncArgs),
    /// Show what `sync` would change in an existing base, without applying it
    Diff(DiffArgs),
    /// Check a schema file without contacting Airtable
    Validate(ValidateArgs),
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sync(args) => commands::sync::handle_sync_command(&cli.global, args).await,
        Commands::Diff(args) => commands::sync::handle_diff_command(&cli.global, args).await,
        Commands::Validate(args) => commands::sync::handle_validate_command(args),
    }
}
