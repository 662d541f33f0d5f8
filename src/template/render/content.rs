//! Content sheets: one Field / Value / Description row per flattened row.

use anyhow::{Context, Result};
use log::debug;
use rust_xlsxwriter::*;

use super::formatting::*;
use super::names::DefinedNames;
use super::options_sheet::OptionsLayout;
use crate::template::flatten::{FlattenedRow, RowKind, RowValidation};
use crate::template::rich_text::RichText;
use crate::template::warnings::GenerationWarning;

const FIELD_COLUMN: u16 = 0;
const VALUE_COLUMN: u16 = 1;
const DESCRIPTION_COLUMN: u16 = 2;

/// First sheet row used for flattened rows; row 0 holds the header
const ROW_OFFSET: u32 = 1;

/// Deepest outline level Excel can group
pub const MAX_OUTLINE_LEVEL: u8 = 7;

const TEXT_AREA_PADDING: &str = "\n\n";
const INVALID_VALUE_TITLE: &str = "Invalid value";

/// Validation attached to a Value cell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidationRule {
    /// Decimal greater than zero
    PositiveNumber,
    /// Whole number greater than zero
    PositiveInteger,
    /// Date on or after 1970-01-01
    DateFromEpoch,
    /// Dropdown sourced from a column of the options sheet
    List { formula: String },
}

impl ValidationRule {
    pub fn error_message(&self) -> &'static str {
        match self {
            ValidationRule::PositiveNumber => "Please enter a number greater than 0",
            ValidationRule::PositiveInteger => "Please enter an integer greater than 0",
            ValidationRule::DateFromEpoch => "Please enter a date",
            ValidationRule::List { .. } => "Please select a value from the list",
        }
    }

    fn to_data_validation(&self) -> Result<DataValidation> {
        let validation = match self {
            ValidationRule::PositiveNumber => {
                DataValidation::new().allow_decimal_number(DataValidationRule::GreaterThan(0.0))
            }
            ValidationRule::PositiveInteger => {
                DataValidation::new().allow_whole_number(DataValidationRule::GreaterThan(0))
            }
            ValidationRule::DateFromEpoch => DataValidation::new().allow_date(
                DataValidationRule::GreaterThanOrEqualTo(ExcelDateTime::from_ymd(1970, 1, 1)?),
            ),
            ValidationRule::List { formula } => {
                DataValidation::new().allow_list_formula(Formula::new(formula))
            }
        };

        let validation = validation
            .set_error_title(INVALID_VALUE_TITLE)?
            .set_error_message(self.error_message())?;
        Ok(validation)
    }
}

/// Where one flattened row ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRow {
    /// Zero-based sheet row
    pub row: u32,
    pub name: String,
    pub kind: RowKind,
    pub outline_level: u8,
    pub shaded: bool,
    pub validation: Option<ValidationRule>,
    /// Defined name registered for the Value cell
    pub defined_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub name: String,
    pub rows: Vec<LayoutRow>,
}

impl SheetLayout {
    pub fn row_named(&self, name: &str) -> Option<&LayoutRow> {
        self.rows.iter().find(|row| row.name == name)
    }

    pub fn input_rows(&self) -> impl Iterator<Item = &LayoutRow> {
        self.rows.iter().filter(|row| row.kind == RowKind::Input)
    }
}

/// Alternating fill that restarts after every heading
#[derive(Debug, Default)]
struct ShadingCounter {
    since_heading: usize,
}

impl ShadingCounter {
    fn heading(&mut self) {
        self.since_heading = 0;
    }

    fn next_input(&mut self) -> bool {
        let shaded = self.since_heading % 2 == 0;
        self.since_heading += 1;
        shaded
    }
}

/// Resolve the spreadsheet rule for a row, recording why a dropdown was skipped
pub fn resolve_validation(
    row: &FlattenedRow,
    options: &OptionsLayout,
    warnings: &mut Vec<GenerationWarning>,
) -> Option<ValidationRule> {
    match row.validation.as_ref()? {
        RowValidation::Number => Some(ValidationRule::PositiveNumber),
        RowValidation::Integer => Some(ValidationRule::PositiveInteger),
        RowValidation::Date => Some(ValidationRule::DateFromEpoch),
        RowValidation::TextArea => None,
        RowValidation::List { options_key } => {
            let Some(column) = options.column_for(options_key) else {
                warnings.push(GenerationWarning::UnresolvedOptions {
                    row: row.name.clone(),
                    options_key: options_key.clone(),
                });
                return None;
            };
            match column.range_formula() {
                Some(formula) => Some(ValidationRule::List { formula }),
                None => {
                    warnings.push(GenerationWarning::EmptyOptions {
                        row: row.name.clone(),
                        options_key: options_key.clone(),
                    });
                    None
                }
            }
        }
    }
}

/// Write `text` into one cell, as a rich string when it carries emphasis
pub fn write_rich_text(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    text: &RichText,
    format: &Format,
) -> Result<()> {
    if text.is_plain() {
        sheet.write_string_with_format(row, col, &text.plain_text(), format)?;
        return Ok(());
    }

    let runs: Vec<(Format, &str)> = text
        .runs()
        .iter()
        .filter_map(|run| {
            let content = run.as_text().filter(|content| !content.is_empty())?;
            Some((create_run_format(format, run.emphasis), content))
        })
        .collect();

    if runs.is_empty() {
        sheet.write_blank(row, col, format)?;
        return Ok(());
    }

    let segments: Vec<(&Format, &str)> = runs.iter().map(|(fmt, content)| (fmt, *content)).collect();
    sheet.write_rich_string_with_format(row, col, &segments, format)?;
    Ok(())
}

fn set_up_sheet(sheet: &mut Worksheet, name: &str) -> Result<()> {
    sheet.set_name(name)?;
    sheet
        .set_tab_color(Color::RGB(COLOR_PRIMARY_RED))
        .set_screen_gridlines(false)
        .set_default_row_height(30);

    let wrap_format = create_wrap_format();
    sheet.set_column_width(FIELD_COLUMN, 50)?;
    sheet.set_column_width(VALUE_COLUMN, 85)?;
    sheet.set_column_width(DESCRIPTION_COLUMN, 80)?;
    sheet.set_column_format(FIELD_COLUMN, &wrap_format)?;
    sheet.set_column_format(VALUE_COLUMN, &wrap_format)?;

    let header_format = create_header_format();
    sheet.write_string_with_format(0, FIELD_COLUMN, "Field", &header_format)?;
    sheet.write_string_with_format(0, VALUE_COLUMN, "Value", &header_format)?;
    sheet.write_string_with_format(0, DESCRIPTION_COLUMN, "Description", &header_format)?;
    Ok(())
}

fn write_heading_row(sheet: &mut Worksheet, row: u32, flattened: &FlattenedRow) -> Result<()> {
    let format = create_heading_format(
        HeadingStyle::for_level(flattened.outline_level),
        flattened.outline_level,
    );
    sheet.merge_range(
        row,
        FIELD_COLUMN,
        row,
        DESCRIPTION_COLUMN,
        &flattened.label.plain_text(),
        &format,
    )?;
    Ok(())
}

fn write_input_row(
    sheet: &mut Worksheet,
    row: u32,
    flattened: &FlattenedRow,
    shaded: bool,
    validation: Option<&ValidationRule>,
) -> Result<()> {
    let label = match flattened.validation {
        Some(RowValidation::TextArea) => flattened.label.padded(TEXT_AREA_PADDING),
        _ => flattened.label.clone(),
    };
    write_rich_text(
        sheet,
        row,
        FIELD_COLUMN,
        &label,
        &create_label_format(flattened.outline_level, shaded),
    )?;

    sheet.write_blank(row, VALUE_COLUMN, &create_value_format(shaded))?;

    let description_format = create_description_format(shaded);
    match flattened.description.as_ref().filter(|text| !text.is_empty()) {
        Some(description) => {
            write_rich_text(sheet, row, DESCRIPTION_COLUMN, description, &description_format)?
        }
        None => {
            sheet.write_blank(row, DESCRIPTION_COLUMN, &description_format)?;
        }
    }

    if let Some(rule) = validation {
        sheet.add_data_validation(row, VALUE_COLUMN, row, VALUE_COLUMN, &rule.to_data_validation()?)?;
    }
    Ok(())
}

fn group_row(sheet: &mut Worksheet, row: u32, outline_level: u8) -> Result<()> {
    for _ in 0..outline_level.min(MAX_OUTLINE_LEVEL) {
        sheet.group_rows(row, row)?;
    }
    Ok(())
}

/// Build a content sheet from `rows` and add it to the workbook
pub fn create_content_sheet(
    workbook: &mut Workbook,
    name: &str,
    rows: &[FlattenedRow],
    options: &OptionsLayout,
    names: &mut DefinedNames,
    warnings: &mut Vec<GenerationWarning>,
) -> Result<SheetLayout> {
    let mut sheet = Worksheet::new();
    set_up_sheet(&mut sheet, name).with_context(|| format!("Failed to set up sheet '{}'", name))?;

    let mut layout = SheetLayout {
        name: name.to_string(),
        rows: Vec::with_capacity(rows.len()),
    };
    let mut shading = ShadingCounter::default();

    for (index, flattened) in rows.iter().enumerate() {
        let row = u32::try_from(index)
            .ok()
            .and_then(|index| index.checked_add(ROW_OFFSET))
            .context("Too many rows for one sheet")?;

        let (shaded, validation) = match flattened.kind {
            RowKind::Heading => {
                write_heading_row(&mut sheet, row, flattened)?;
                shading.heading();
                (false, None)
            }
            RowKind::Input => {
                let shaded = shading.next_input();
                let validation = resolve_validation(flattened, options, warnings);
                write_input_row(&mut sheet, row, flattened, shaded, validation.as_ref())
                    .with_context(|| format!("Failed to write row '{}'", flattened.name))?;
                (shaded, validation)
            }
        };
        group_row(&mut sheet, row, flattened.outline_level)?;

        layout.rows.push(LayoutRow {
            row,
            name: flattened.name.clone(),
            kind: flattened.kind,
            outline_level: flattened.outline_level,
            shaded,
            validation,
            defined_name: None,
        });
    }

    workbook.push_worksheet(sheet);

    for layout_row in layout.rows.iter_mut().filter(|row| row.kind == RowKind::Input) {
        layout_row.defined_name = names.define_cell(
            workbook,
            &layout_row.name,
            name,
            layout_row.row,
            VALUE_COLUMN,
            warnings,
        );
    }

    debug!("Sheet '{}' written with {} rows", name, layout.rows.len());
    Ok(layout)
}
