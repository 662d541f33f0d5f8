use anyhow::{Result, bail};
use clap::Args;
use colored::*;

use super::{ReferenceArgs, print_warnings};
use crate::api::ReferenceData;
use crate::config::Config;
use crate::dref::{DrefTemplate, SectorDescriptions};
use crate::template::flatten::{FlattenedRow, RowValidation, flatten};
use crate::template::tabs::route_rows;

#[derive(Args, Debug)]
pub struct RowsCommand {
    #[command(flatten)]
    pub reference: ReferenceArgs,

    /// Only print rows of this sheet
    #[arg(short, long)]
    pub sheet: Option<String>,

    /// Use empty reference data instead of fetching it
    #[arg(long, conflicts_with = "reference_data")]
    pub offline: bool,
}

fn validation_label(row: &FlattenedRow) -> String {
    match &row.validation {
        None => String::new(),
        Some(RowValidation::Number) => "number".into(),
        Some(RowValidation::Integer) => "integer".into(),
        Some(RowValidation::Date) => "date".into(),
        Some(RowValidation::TextArea) => "textArea".into(),
        Some(RowValidation::List { options_key }) => format!("list({})", options_key),
    }
}

pub async fn rows_command(args: RowsCommand, config: &Config) -> Result<()> {
    let reference = if args.offline {
        ReferenceData::default()
    } else {
        args.reference.load(config).await?
    };
    let template = DrefTemplate::build(&reference, &SectorDescriptions::embedded()?, config.slot_count)?;

    let flattened = flatten(&template.schema, &template.catalog);
    let routed = route_rows(&flattened.rows, &template.tabs);

    if let Some(sheet) = &args.sheet {
        if routed.rows_for(sheet).is_none() {
            bail!("Unknown sheet '{}'", sheet);
        }
    }

    for entry in &routed.sheets {
        if args.sheet.as_ref().is_some_and(|sheet| *sheet != entry.sheet) {
            continue;
        }

        println!("{} ({} rows)", entry.sheet.bright_white().bold(), entry.rows.len());
        for row in &entry.rows {
            let indent = "  ".repeat(usize::from(row.outline_level) + 1);
            if row.is_heading() {
                println!("{}{}", indent, row.name.bold());
            } else {
                println!("{}{} {}", indent, row.name, validation_label(row).dimmed());
            }
        }
        println!();
    }

    let mut warnings = flattened.warnings;
    warnings.extend(routed.warnings);
    print_warnings(&warnings);
    Ok(())
}
