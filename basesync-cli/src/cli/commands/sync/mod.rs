//! Schema sync commands

pub mod handler;

use clap::Args;
use std::path::PathBuf;

pub use handler::{handle_diff_command, handle_sync_command, handle_validate_command};

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// JSON schema definition file
    pub schema_file: PathBuf,

    /// Id of the base to update (a new base is created when omitted)
    #[arg(short, long, value_name = "BASE_ID")]
    pub base: Option<String>,

    /// Create a new base even when --base is given
    #[arg(long)]
    pub create_new: bool,

    /// Export the sync report as JSON
    #[arg(short, long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// JSON schema definition file
    pub schema_file: PathBuf,

    /// Id of the base to compare against
    #[arg(short, long, value_name = "BASE_ID")]
    pub base: String,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON schema definition file
    pub schema_file: PathBuf,
}
