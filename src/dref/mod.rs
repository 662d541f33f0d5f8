//! The DREF application import template

pub mod catalog;
pub mod cover;
pub mod hooks;
pub mod schema;
pub mod tabs;

use anyhow::Result;

use crate::api::models::ReferenceData;
use crate::template::options::OptionsCatalog;
use crate::template::render::{RenderSettings, TemplateSource};
use crate::template::schema::FieldSchemaNode;
use crate::template::tabs::TabAssignment;

pub use catalog::{SectorDescriptions, build_dref_catalog};
pub use cover::{COVER_SHEET_NAME, dref_cover};
pub use hooks::DrefImportHooks;
pub use schema::dref_schema;
pub use tabs::{CONTENT_SHEETS, dref_tab_assignment};

/// DREF type code of a response operation
pub const DREF_TYPE_RESPONSE: i64 = 2;

pub const WORKBOOK_TITLE: &str = "DREF Application Import Template";
pub const WORKBOOK_AUTHOR: &str = "IFRC GO";

/// Schema, options and routing of one DREF template generation
#[derive(Debug, Clone)]
pub struct DrefTemplate {
    pub schema: FieldSchemaNode,
    pub catalog: OptionsCatalog,
    pub tabs: TabAssignment,
}

impl DrefTemplate {
    pub fn build(
        reference: &ReferenceData,
        descriptions: &SectorDescriptions,
        slot_count: usize,
    ) -> Result<Self> {
        Ok(Self {
            schema: dref_schema()?,
            catalog: build_dref_catalog(reference, descriptions, slot_count),
            tabs: dref_tab_assignment(),
        })
    }

    pub fn source(&self) -> TemplateSource<'_> {
        TemplateSource {
            schema: &self.schema,
            catalog: &self.catalog,
            tabs: &self.tabs,
        }
    }

    /// Cover, the five content sheets and document properties
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            cover: Some(dref_cover()),
            logo: None,
            content_sheets: Some(CONTENT_SHEETS.iter().map(|sheet| sheet.to_string()).collect()),
            title: Some(WORKBOOK_TITLE.to_string()),
            author: Some(WORKBOOK_AUTHOR.to_string()),
        }
    }
}

/// Label used in the file name; falls back to the numeric code
pub fn dref_type_label(reference: &ReferenceData, dref_type: i64) -> String {
    match reference.dref_type_label(dref_type) {
        Some(label) => label.to_string(),
        None if dref_type == DREF_TYPE_RESPONSE => "Response".to_string(),
        None => dref_type.to_string(),
    }
}
