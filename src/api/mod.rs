//! GO API reference data: enumerations, countries and disaster types

pub mod client;
pub mod models;
pub mod source;

pub use client::{DEFAULT_API_URL, GoApiClient};
pub use models::{Country, DisasterType, GlobalEnums, Paginated, ReferenceData};
pub use source::{FileReferenceSource, ReferenceDataSource, save_snapshot};
