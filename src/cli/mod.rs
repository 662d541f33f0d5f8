pub mod app;
pub mod commands;

use anyhow::Result;
use log::debug;

pub use app::{Cli, Commands};

use crate::config::Config;
use commands::config::config_command;
use commands::generate::generate_command;
use commands::import::import_command;
use commands::reference::fetch_reference_data_command;
use commands::rows::rows_command;

/// Load configuration and dispatch the parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::get_config_path()?,
    };
    let config = Config::load_from(&config_path)?;
    debug!("Using config file {:?}", config_path);

    match cli.command {
        Commands::Generate(args) => generate_command(args, &config).await,
        Commands::Import(args) => import_command(args, &config).await,
        Commands::Rows(args) => rows_command(args, &config).await,
        Commands::FetchReferenceData(args) => fetch_reference_data_command(args, &config).await,
        Commands::Config(args) => config_command(args, &config, &config_path),
    }
}
