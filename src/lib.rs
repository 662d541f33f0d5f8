//! DREF application import templates: generation from the form schema and
//! GO reference data, and reading filled templates back into form values.

pub mod api;
pub mod cli;
pub mod config;
pub mod dref;
pub mod template;
