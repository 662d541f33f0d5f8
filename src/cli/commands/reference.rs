use anyhow::Result;
use clap::Args;
use colored::*;
use std::path::PathBuf;

use crate::api::save_snapshot;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct FetchReferenceDataCommand {
    /// Snapshot file to write
    #[arg(short, long, value_name = "FILE", default_value = "reference_data.json")]
    pub out: PathBuf,

    /// GO API base URL (overrides config)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
}

pub async fn fetch_reference_data_command(args: FetchReferenceDataCommand, config: &Config) -> Result<()> {
    let reference = super::ReferenceArgs {
        reference_data: None,
        api_url: args.api_url,
    };
    let data = reference.load(config).await?;
    save_snapshot(&data, &args.out).await?;

    println!(
        "{} Saved {} countries, {} disaster types to {}",
        "✓".bright_green().bold(),
        data.countries.len(),
        data.disaster_types.len(),
        args.out.display().to_string().bright_green().bold()
    );
    Ok(())
}
