//! Routing of flattened rows to content sheets.

use std::collections::{HashMap, HashSet};

use super::flatten::FlattenedRow;
use super::warnings::GenerationWarning;

/// Static mapping from top-level field name to the sheet it is rendered on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabAssignment {
    sheets: Vec<String>,
    fields: HashMap<String, String>,
}

impl TabAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sheet` (keeping first-seen order) and route `fields` to it.
    ///
    /// A field assigned twice keeps its latest sheet.
    pub fn assign<I, S>(mut self, sheet: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.sheets.iter().any(|existing| existing == sheet) {
            self.sheets.push(sheet.to_string());
        }
        for field in fields {
            self.fields.insert(field.into(), sheet.to_string());
        }
        self
    }

    pub fn sheet_for(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(String::as_str)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Rows destined for one sheet, in reading order
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRows {
    pub sheet: String,
    pub rows: Vec<FlattenedRow>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutedRows {
    pub sheets: Vec<SheetRows>,
    pub warnings: Vec<GenerationWarning>,
}

impl RoutedRows {
    pub fn rows_for(&self, sheet: &str) -> Option<&[FlattenedRow]> {
        self.sheets
            .iter()
            .find(|entry| entry.sheet == sheet)
            .map(|entry| entry.rows.as_slice())
    }
}

/// Split `rows` by sheet. Every assigned sheet gets an entry, even if empty.
///
/// Rows of unmapped fields are dropped with one warning per field.
pub fn route_rows(rows: &[FlattenedRow], assignment: &TabAssignment) -> RoutedRows {
    let mut routed = RoutedRows {
        sheets: assignment
            .sheet_names()
            .map(|sheet| SheetRows {
                sheet: sheet.to_string(),
                rows: Vec::new(),
            })
            .collect(),
        warnings: Vec::new(),
    };
    let mut reported = HashSet::new();

    for row in rows {
        let target = assignment
            .sheet_for(&row.field)
            .and_then(|sheet| routed.sheets.iter_mut().find(|entry| entry.sheet == sheet));

        match target {
            Some(entry) => entry.rows.push(row.clone()),
            None => {
                if reported.insert(row.field.clone()) {
                    routed.warnings.push(GenerationWarning::UnmappedField {
                        field: row.field.clone(),
                    });
                }
            }
        }
    }

    routed
}
