mod api;
mod cli;
mod config;
mod services;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.global.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    if cli.global.no_color {
        colored::control::set_override(false);
    }

    cli::run(cli).await
}
