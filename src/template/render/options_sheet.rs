//! Hidden sheet holding one column of labels per options key.
//!
//! Content sheets point their dropdowns at these columns, and every label
//! cell carries a defined name `<optionsKey>__<key>` so a selection can be
//! mapped back to its key when a filled template is read.

use anyhow::{Context, Result};
use log::debug;
use rust_xlsxwriter::*;

use super::names::{DefinedNames, column_name, quote_sheet_name};
use crate::template::flatten::combined_key;
use crate::template::options::OptionsCatalog;
use crate::template::warnings::GenerationWarning;

pub const OPTIONS_SHEET_NAME: &str = "options";

/// Where the labels of one options key live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsColumn {
    pub options_key: String,
    pub column: u16,
    pub len: usize,
}

impl OptionsColumn {
    /// List formula covering rows 2 through N+1 of the column
    pub fn range_formula(&self) -> Option<String> {
        if self.len == 0 {
            return None;
        }
        let letter = column_name(self.column);
        Some(format!(
            "={}!${}$2:${}${}",
            quote_sheet_name(OPTIONS_SHEET_NAME),
            letter,
            letter,
            self.len + 1
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsLayout {
    pub columns: Vec<OptionsColumn>,
}

impl OptionsLayout {
    pub fn column_for(&self, options_key: &str) -> Option<&OptionsColumn> {
        self.columns
            .iter()
            .find(|column| column.options_key == options_key)
    }
}

/// Defined name of the cell holding option `key` of `options_key`
pub fn option_cell_name(options_key: &str, key: &str) -> String {
    combined_key(key, Some(options_key))
}

/// Column placement of every options key, in catalog order
pub fn options_layout(catalog: &OptionsCatalog) -> Result<OptionsLayout> {
    let columns = catalog
        .iter()
        .enumerate()
        .map(|(index, (options_key, items))| {
            let column = u16::try_from(index).context("Too many option lists for one sheet")?;
            Ok(OptionsColumn {
                options_key: options_key.to_string(),
                column,
                len: items.len(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(OptionsLayout { columns })
}

/// Write the hidden options sheet and name every option cell
pub fn create_options_sheet(
    workbook: &mut Workbook,
    catalog: &OptionsCatalog,
    names: &mut DefinedNames,
    warnings: &mut Vec<GenerationWarning>,
) -> Result<OptionsLayout> {
    let layout = options_layout(catalog)?;

    let mut sheet = Worksheet::new();
    sheet.set_name(OPTIONS_SHEET_NAME)?;
    sheet.set_hidden(true);

    let header_format = Format::new().set_bold();
    let mut cell_names = Vec::new();

    for column in &layout.columns {
        sheet.write_string_with_format(0, column.column, &column.options_key, &header_format)?;
        sheet.set_column_width(column.column, 30)?;

        let items = catalog.get(&column.options_key).unwrap_or_default();
        for (offset, item) in items.iter().enumerate() {
            let row = u32::try_from(offset + 1).context("Option list too long")?;
            sheet.write_string(row, column.column, &item.label)?;
            cell_names.push((
                option_cell_name(&column.options_key, &item.key.to_string()),
                row,
                column.column,
            ));
        }
    }
    workbook.push_worksheet(sheet);

    for (name, row, col) in cell_names {
        names.define_cell(workbook, &name, OPTIONS_SHEET_NAME, row, col, warnings);
    }

    debug!("Options sheet written with {} columns", layout.columns.len());
    Ok(layout)
}
