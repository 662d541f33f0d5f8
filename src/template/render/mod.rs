//! Workbook rendering for import templates

pub mod content;
pub mod cover;
pub mod formatting;
pub mod names;
pub mod options_sheet;

use anyhow::{Context, Result};
use log::{debug, info};
use rust_xlsxwriter::*;
use std::collections::HashSet;
use std::path::Path;

use super::flatten::flatten;
use super::options::OptionsCatalog;
use super::schema::FieldSchemaNode;
use super::tabs::{TabAssignment, route_rows};
use super::warnings::GenerationWarning;

pub use content::{LayoutRow, SheetLayout, ValidationRule, create_content_sheet};
pub use cover::{CoverBlock, CoverContent, CoverStyle, create_cover_sheet};
pub use names::DefinedNames;
pub use options_sheet::{OPTIONS_SHEET_NAME, OptionsColumn, OptionsLayout, create_options_sheet};

/// Everything a template is generated from
#[derive(Debug, Clone, Copy)]
pub struct TemplateSource<'a> {
    pub schema: &'a FieldSchemaNode,
    pub catalog: &'a OptionsCatalog,
    pub tabs: &'a TabAssignment,
}

#[derive(Debug, Clone, Default)]
pub struct RenderSettings {
    pub cover: Option<CoverContent>,
    pub logo: Option<Vec<u8>>,
    /// Sheets to create; `None` creates every sheet of the tab assignment
    pub content_sheets: Option<Vec<String>>,
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Structural summary of a rendered workbook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkbookLayout {
    pub cover_sheet: Option<String>,
    pub sheets: Vec<SheetLayout>,
    pub options: OptionsLayout,
}

impl WorkbookLayout {
    pub fn sheet(&self, name: &str) -> Option<&SheetLayout> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.rows.len()).sum()
    }
}

pub struct RenderedTemplate {
    pub workbook: Workbook,
    pub layout: WorkbookLayout,
    pub warnings: Vec<GenerationWarning>,
}

impl RenderedTemplate {
    pub fn to_buffer(&mut self) -> Result<Vec<u8>> {
        self.workbook
            .save_to_buffer()
            .context("Failed to serialize template workbook")
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.workbook
            .save(path)
            .with_context(|| format!("Failed to save Excel file: {}", path.display()))
    }
}

/// Flatten, route and render a template in one pass
pub fn render_template(source: TemplateSource<'_>, settings: &RenderSettings) -> Result<RenderedTemplate> {
    let flattened = flatten(source.schema, source.catalog);
    let mut routed = route_rows(&flattened.rows, source.tabs);

    let mut warnings = flattened.warnings;
    warnings.append(&mut routed.warnings);

    let mut workbook = Workbook::new();
    let mut properties = DocProperties::new();
    if let Some(title) = &settings.title {
        properties = properties.set_title(title);
    }
    if let Some(author) = &settings.author {
        properties = properties.set_author(author);
    }
    workbook.set_properties(&properties);

    let mut layout = WorkbookLayout::default();
    let mut names = DefinedNames::new();

    if let Some(cover) = &settings.cover {
        create_cover_sheet(&mut workbook, cover, settings.logo.as_deref())
            .context("Failed to build cover sheet")?;
        layout.cover_sheet = Some(cover.sheet_name.clone());
    }

    let created: Vec<&str> = match &settings.content_sheets {
        Some(sheets) => sheets.iter().map(String::as_str).collect(),
        None => source.tabs.sheet_names().collect(),
    };
    let options = options_sheet::options_layout(source.catalog)?;

    for sheet in &created {
        let rows = routed.rows_for(sheet).unwrap_or_default();
        let sheet_layout =
            create_content_sheet(&mut workbook, sheet, rows, &options, &mut names, &mut warnings)
                .with_context(|| format!("Failed to build sheet '{}'", sheet))?;
        layout.sheets.push(sheet_layout);
    }

    // Rows routed to a sheet that was not created are skipped, one warning per field
    let mut reported = HashSet::new();
    for entry in &routed.sheets {
        if created.contains(&entry.sheet.as_str()) {
            continue;
        }
        for row in &entry.rows {
            if reported.insert(row.field.as_str()) {
                warnings.push(GenerationWarning::MissingWorksheet {
                    sheet: entry.sheet.clone(),
                    field: row.field.clone(),
                });
            }
        }
    }

    layout.options = create_options_sheet(&mut workbook, source.catalog, &mut names, &mut warnings)
        .context("Failed to build options sheet")?;

    info!(
        "Rendered template with {} sheets, {} rows and {} warnings",
        layout.sheets.len(),
        layout.row_count(),
        warnings.len()
    );
    debug!("Registered {} defined names", names.len());

    Ok(RenderedTemplate {
        workbook,
        layout,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::options::{OptionItem, OptionsCatalogBuilder};
    use crate::template::schema::{SchemaField, ValidationKind};

    fn source_parts() -> (FieldSchemaNode, OptionsCatalog, TabAssignment) {
        let schema = FieldSchemaNode::object(vec![
            SchemaField::select("country", "Country", ValidationKind::Number, "country"),
            SchemaField::input("title", "Title", ValidationKind::String),
            SchemaField::input("amount", "Amount", ValidationKind::Number),
        ]);
        let catalog = OptionsCatalogBuilder::new()
            .list("country", vec![OptionItem::new(1_i64, "Nepal")])
            .build();
        let tabs = TabAssignment::new()
            .assign("Overview", ["country", "title"])
            .assign("Operation", ["amount"]);
        (schema, catalog, tabs)
    }

    #[test]
    fn test_every_assigned_sheet_is_rendered() {
        let (schema, catalog, tabs) = source_parts();
        let source = TemplateSource { schema: &schema, catalog: &catalog, tabs: &tabs };
        let mut rendered = render_template(source, &RenderSettings::default()).unwrap();

        assert!(rendered.warnings.is_empty());
        assert_eq!(rendered.layout.sheets.len(), 2);
        assert_eq!(rendered.layout.sheet("Overview").unwrap().rows.len(), 2);
        assert_eq!(
            rendered.layout.options.column_for("country").unwrap().range_formula().as_deref(),
            Some("=options!$B$2:$B$2")
        );
        assert!(!rendered.to_buffer().unwrap().is_empty());
    }

    #[test]
    fn test_missing_sheet_skips_rows_without_failing() {
        let (schema, catalog, tabs) = source_parts();
        let source = TemplateSource { schema: &schema, catalog: &catalog, tabs: &tabs };
        let settings = RenderSettings {
            content_sheets: Some(vec!["Overview".into()]),
            ..RenderSettings::default()
        };
        let rendered = render_template(source, &settings).unwrap();

        assert_eq!(rendered.layout.sheets.len(), 1);
        assert_eq!(
            rendered.warnings,
            vec![GenerationWarning::MissingWorksheet {
                sheet: "Operation".into(),
                field: "amount".into()
            }]
        );
    }

    #[test]
    fn test_routing_warnings_kept_alongside_rendered_rows() {
        let (schema, catalog, _) = source_parts();
        let tabs = TabAssignment::new().assign("Overview", ["country", "title"]);
        let source = TemplateSource { schema: &schema, catalog: &catalog, tabs: &tabs };
        let rendered = render_template(source, &RenderSettings::default()).unwrap();

        assert_eq!(
            rendered.warnings,
            vec![GenerationWarning::UnmappedField { field: "amount".into() }]
        );
        let overview = rendered.layout.sheet("Overview").unwrap();
        assert_eq!(overview.rows.len(), 2);
        assert!(overview.row_named("title").is_some());
    }
}
