use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use log::info;
use std::path::PathBuf;
use std::time::Instant;

use super::{ReferenceArgs, print_warnings};
use crate::config::Config;
use crate::dref::{DrefTemplate, SectorDescriptions, dref_type_label};
use crate::template::export::{DirectorySink, ExportRequest, LogoSource, TemplateExporter};

#[derive(Args, Debug)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub reference: ReferenceArgs,

    /// Directory the template is written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Cover logo URL or file path
    #[arg(long, value_name = "URL|FILE", conflicts_with = "no_logo")]
    pub logo: Option<String>,

    /// Leave the cover logo out
    #[arg(long)]
    pub no_logo: bool,

    /// DREF type code used for the file name
    #[arg(long)]
    pub dref_type: Option<i64>,

    /// Number of numbered slots for sources, indicators and risks
    #[arg(long)]
    pub slot_count: Option<usize>,

    /// TOML file with sector descriptions
    #[arg(long, value_name = "FILE")]
    pub descriptions: Option<PathBuf>,

    /// Open the template once it is saved
    #[arg(long)]
    pub open: bool,
}

impl GenerateCommand {
    fn logo_source(&self, config: &Config) -> LogoSource {
        if self.no_logo {
            return LogoSource::None;
        }
        self.logo
            .as_deref()
            .or(config.logo_url.as_deref())
            .map(LogoSource::from_setting)
            .unwrap_or_default()
    }
}

pub async fn generate_command(args: GenerateCommand, config: &Config) -> Result<()> {
    let start = Instant::now();

    let reference = args.reference.load(config).await?;
    let descriptions = SectorDescriptions::load_or_embedded(
        args.descriptions
            .as_deref()
            .or(config.descriptions_path.as_deref()),
    )?;
    let slot_count = args.slot_count.unwrap_or(config.slot_count);
    let template = DrefTemplate::build(&reference, &descriptions, slot_count)?;

    let dref_type = args.dref_type.unwrap_or(config.dref_type);
    let type_label = dref_type_label(&reference, dref_type);

    let output_dir = args.output_dir.clone().unwrap_or_else(|| config.output_dir.clone());
    let sink = DirectorySink::new(&output_dir).open_after_save(args.open || config.auto_open);
    let http = args.reference.api_client(config)?.http_client();
    let exporter = TemplateExporter::new(sink, http);

    println!("🔄 {}", "Generating template...".dimmed());
    let request = ExportRequest {
        source: template.source(),
        settings: template.render_settings(),
        logo: args.logo_source(config),
        type_label,
    };
    let report = exporter
        .generate(request, || info!("Template generation finished"))
        .await
        .context("Template generation failed")?;

    println!(
        "{} Saved {} ({} bytes)",
        "✓".bright_green().bold(),
        report.location.display().to_string().bright_green().bold(),
        report.size
    );
    for sheet in &report.layout.sheets {
        println!("  {} {} rows", sheet.name.cyan(), sheet.rows.len());
    }
    print_warnings(&report.warnings);
    println!(
        "⏱️  Done in {:.2}s",
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
