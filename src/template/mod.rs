//! Import-template generation: schema, options, flattening, rendering and export.

pub mod export;
pub mod flatten;
pub mod import;
pub mod options;
pub mod render;
pub mod rich_text;
pub mod schema;
pub mod tabs;
pub mod warnings;

pub use export::{
    DirectorySink, DownloadSink, ExportRequest, GenerationGuard, GenerationReport, LogoSource,
    TemplateExporter, XLSX_MIME_TYPE, template_file_name,
};
pub use flatten::{FlattenedRow, RowKind, RowValidation, combined_key, flatten, split_combined_key};
pub use import::{FormValues, ValueHook, read_form_values, value_from_template};
pub use options::{OptionItem, OptionKey, OptionsCatalog, OptionsCatalogBuilder, SlotSpec};
pub use render::{RenderSettings, RenderedTemplate, TemplateSource, WorkbookLayout, render_template};
pub use rich_text::{Emphasis, RichText, TextRun};
pub use schema::{FieldSchemaNode, SchemaField, ValidationKind, load_schema};
pub use tabs::{TabAssignment, route_rows};
pub use warnings::GenerationWarning;
