//! Non-fatal problems found while generating a template.
//!
//! Generation prefers partial output over no output: anything that cannot be
//! resolved is skipped and recorded here instead of aborting the run.

use log::warn;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationWarning {
    /// A top-level field has no sheet assigned; its rows were dropped
    UnmappedField { field: String },
    /// A field routes to a sheet the workbook does not contain; its rows were dropped
    MissingWorksheet { sheet: String, field: String },
    /// An options key has no catalog entry
    UnresolvedOptions { row: String, options_key: String },
    /// An options key resolved to an empty list, so no dropdown could be attached
    EmptyOptions { row: String, options_key: String },
    /// An option reference inside a label or description could not be resolved
    UnresolvedReference { row: String, reference: String },
    /// A defined name was rejected by the spreadsheet writer
    InvalidName { name: String, reason: String },
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationWarning::UnmappedField { field } => {
                write!(f, "Field '{}' is not assigned to any sheet", field)
            }
            GenerationWarning::MissingWorksheet { sheet, field } => {
                write!(f, "Sheet '{}' for field '{}' does not exist", sheet, field)
            }
            GenerationWarning::UnresolvedOptions { row, options_key } => {
                write!(f, "Options '{}' used by '{}' are not in the catalog", options_key, row)
            }
            GenerationWarning::EmptyOptions { row, options_key } => {
                write!(f, "Options '{}' used by '{}' are empty", options_key, row)
            }
            GenerationWarning::UnresolvedReference { row, reference } => {
                write!(f, "Reference '{}' in '{}' could not be resolved", reference, row)
            }
            GenerationWarning::InvalidName { name, reason } => {
                write!(f, "Name '{}' was skipped: {}", name, reason)
            }
        }
    }
}

/// Emit every warning through the log facade
pub fn log_warnings(warnings: &[GenerationWarning]) {
    for warning in warnings {
        warn!("{}", warning);
    }
}
