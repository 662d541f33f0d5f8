//! Workbook-level defined names that tie cells back to row and option keys.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_xlsxwriter::Workbook;
use std::collections::HashSet;

use crate::template::warnings::GenerationWarning;

static INVALID_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.]").expect("static name pattern"));

// Names shaped like A1 or R1C1 references are rejected by Excel
static CELL_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:[A-Z]{1,3}[0-9]+|R[0-9]*C[0-9]*|R|C)$").expect("static reference pattern")
});

const MAX_NAME_LENGTH: usize = 255;

/// Rewrite `name` into something Excel accepts as a defined name.
///
/// Names that are already valid come back unchanged, so row names produced by
/// the flattener normally map one to one.
pub fn sanitize_defined_name(name: &str) -> String {
    let mut sanitized = INVALID_NAME_CHARS.replace_all(name, "_").into_owned();

    let starts_validly = sanitized
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');
    if !starts_validly || CELL_REFERENCE.is_match(&sanitized) {
        sanitized.insert(0, '_');
    }

    sanitized.truncate(MAX_NAME_LENGTH);
    sanitized
}

/// Quote a sheet name for use inside a formula
pub fn quote_sheet_name(sheet: &str) -> String {
    let plain = sheet
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain && !sheet.is_empty() {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}

/// Absolute A1 reference such as `$B$12`, from zero-based coordinates
pub fn absolute_cell(row: u32, col: u16) -> String {
    format!("${}${}", column_name(col), row + 1)
}

/// Spreadsheet column letters for a zero-based index
pub fn column_name(col: u16) -> String {
    let mut index = u32::from(col) + 1;
    let mut letters = Vec::new();
    while index > 0 {
        let remainder = (index - 1) % 26;
        letters.push(char::from(b'A' + remainder as u8));
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Registers defined names once each, turning rejections into warnings
#[derive(Debug, Default)]
pub struct DefinedNames {
    used: HashSet<String>,
}

impl DefinedNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `name` at a single cell. Returns the name actually registered.
    pub fn define_cell(
        &mut self,
        workbook: &mut Workbook,
        name: &str,
        sheet: &str,
        row: u32,
        col: u16,
        warnings: &mut Vec<GenerationWarning>,
    ) -> Option<String> {
        let sanitized = sanitize_defined_name(name);
        if sanitized != name {
            debug!("Defined name '{}' sanitised to '{}'", name, sanitized);
        }

        if !self.used.insert(sanitized.to_lowercase()) {
            warnings.push(GenerationWarning::InvalidName {
                name: name.to_string(),
                reason: format!("'{}' is already defined", sanitized),
            });
            return None;
        }

        let formula = format!("={}!{}", quote_sheet_name(sheet), absolute_cell(row, col));
        match workbook.define_name(sanitized.as_str(), &formula) {
            Ok(_) => Some(sanitized),
            Err(e) => {
                warnings.push(GenerationWarning::InvalidName {
                    name: name.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
