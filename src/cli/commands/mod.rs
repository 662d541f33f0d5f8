pub mod config;
pub mod generate;
pub mod import;
pub mod reference;
pub mod rows;

use anyhow::Result;
use clap::Args;
use colored::*;
use log::info;
use std::path::PathBuf;

use crate::api::{FileReferenceSource, GoApiClient, ReferenceData, ReferenceDataSource};
use crate::config::Config;
use crate::template::warnings::GenerationWarning;

/// Where reference data is read from
#[derive(Args, Debug, Clone, Default)]
pub struct ReferenceArgs {
    /// Read reference data from a snapshot instead of the API
    #[arg(long, value_name = "FILE")]
    pub reference_data: Option<PathBuf>,

    /// GO API base URL (overrides config)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
}

impl ReferenceArgs {
    pub fn api_client(&self, config: &Config) -> Result<GoApiClient> {
        let base_url = self.api_url.as_deref().unwrap_or(&config.api_url);
        GoApiClient::new(base_url, config.request_timeout())
    }

    pub fn source(&self, config: &Config) -> Result<Box<dyn ReferenceDataSource>> {
        let source: Box<dyn ReferenceDataSource> = match &self.reference_data {
            Some(path) => Box::new(FileReferenceSource::new(path)),
            None => Box::new(self.api_client(config)?),
        };
        Ok(source)
    }

    pub async fn load(&self, config: &Config) -> Result<ReferenceData> {
        let source = self.source(config)?;
        eprintln!("🌍 Reference data from {}", source.describe().cyan());
        let data = source.load().await?;
        info!(
            "Loaded {} countries and {} disaster types",
            data.countries.len(),
            data.disaster_types.len()
        );
        Ok(data)
    }
}

pub fn print_warnings(warnings: &[GenerationWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!(
        "{} {} warning(s):",
        "⚠️".bright_yellow().bold(),
        warnings.len()
    );
    for warning in warnings {
        println!("  {} {}", "•".bright_yellow(), warning);
    }
}
