use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::config::ConfigCommands;
use super::commands::generate::GenerateCommand;
use super::commands::import::ImportCommand;
use super::commands::reference::FetchReferenceDataCommand;
use super::commands::rows::RowsCommand;

#[derive(Parser)]
#[command(name = "dref-template")]
#[command(version)]
#[command(about = "Generate and read back DREF application import templates")]
pub struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log to stderr instead of dref-template.log
    #[arg(long, global = true)]
    pub log_stderr: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the import template workbook
    Generate(GenerateCommand),
    /// Read a filled template and print the DREF form as JSON
    Import(ImportCommand),
    /// Print the flattened rows of the template
    Rows(RowsCommand),
    /// Save a snapshot of the GO reference data for offline use
    FetchReferenceData(FetchReferenceDataCommand),
    /// Inspect or create the configuration file
    Config(ConfigCommands),
}
