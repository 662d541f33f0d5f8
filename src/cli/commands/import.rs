use anyhow::{Context, Result, bail};
use clap::Args;
use colored::*;
use std::path::PathBuf;

use super::ReferenceArgs;
use crate::config::Config;
use crate::dref::{DrefImportHooks, DrefTemplate, SectorDescriptions};
use crate::template::import::{read_form_values, value_from_template};

#[derive(Args, Debug)]
pub struct ImportCommand {
    /// Filled template to read
    pub file: PathBuf,

    #[command(flatten)]
    pub reference: ReferenceArgs,

    /// Pretty print the JSON
    #[arg(short, long)]
    pub pretty: bool,

    /// Write the JSON to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

pub async fn import_command(args: ImportCommand, config: &Config) -> Result<()> {
    if !args.file.exists() {
        bail!("Template file does not exist: {}", args.file.display());
    }

    let values = read_form_values(&args.file)?;
    eprintln!(
        "📄 Read {} filled cells from {}",
        values.len(),
        args.file.display().to_string().cyan()
    );

    // Labels are mapped back to keys, so the same reference data as at generation time is needed
    let reference = args.reference.load(config).await?;
    let template = DrefTemplate::build(&reference, &SectorDescriptions::default(), config.slot_count)?;
    let value = value_from_template(&template.schema, &template.catalog, &values, &DrefImportHooks);

    let json = if args.pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .context("Failed to serialize imported form")?;

    match &args.out {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} Wrote {}", "✓".bright_green().bold(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
