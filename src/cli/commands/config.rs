use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use std::path::Path;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ConfigCommands {
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommands {
    /// Show the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

pub fn config_command(args: ConfigCommands, config: &Config, path: &Path) -> Result<()> {
    match args.command {
        ConfigSubcommands::Show => {
            let content =
                toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;
            println!("{}", format!("# {}", path.display()).dimmed());
            println!("{}", content);
        }
        ConfigSubcommands::Path => println!("{}", path.display()),
        ConfigSubcommands::Init { force } => {
            if path.exists() && !force {
                println!(
                    "  {} {} already exists (use --force to overwrite)",
                    "⚠️".bright_yellow().bold(),
                    path.display()
                );
                return Ok(());
            }
            Config::default().save_to(path)?;
            println!(
                "{} Wrote default config to {}",
                "✓".bright_green().bold(),
                path.display().to_string().bright_green().bold()
            );
        }
    }
    Ok(())
}
