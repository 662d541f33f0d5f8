//! Turn a nested schema into the ordered row list a worksheet is built from.

use log::debug;

use super::options::OptionsCatalog;
use super::rich_text::{OptionAttribute, OptionRef, RichText};
use super::schema::{FieldMeta, FieldSchemaNode, ListField, SchemaField, ValidationKind};
use super::warnings::GenerationWarning;

/// Joins a parent path and a child key into a row name
pub const KEY_SEPARATOR: &str = "__";

const HEADING_BEFORE_KEY: &str = "heading_before";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    Heading,
    Input,
}

/// Spreadsheet-level validation requested by an input row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowValidation {
    Number,
    Integer,
    Date,
    TextArea,
    List { options_key: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedRow {
    pub name: String,
    pub kind: RowKind,
    pub outline_level: u8,
    pub label: RichText,
    pub description: Option<RichText>,
    pub validation: Option<RowValidation>,
    /// Top-level schema field the row belongs to
    pub field: String,
}

impl FlattenedRow {
    pub fn options_key(&self) -> Option<&str> {
        match &self.validation {
            Some(RowValidation::List { options_key }) => Some(options_key),
            _ => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.kind == RowKind::Heading
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flattened {
    pub rows: Vec<FlattenedRow>,
    pub warnings: Vec<GenerationWarning>,
}

pub fn combined_key(key: &str, parent: Option<&str>) -> String {
    match parent {
        Some(parent) => format!("{}{}{}", parent, KEY_SEPARATOR, key),
        None => key.to_string(),
    }
}

/// Split a row name into its top-level field and the remainder.
///
/// This is the exact inverse of [`combined_key`] for top-level parents, which
/// never contain the separator.
pub fn split_combined_key(name: &str) -> (&str, Option<&str>) {
    match name.split_once(KEY_SEPARATOR) {
        Some((parent, rest)) => (parent, Some(rest)),
        None => (name, None),
    }
}

/// One step of a row's ancestor path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Slot(String),
    HeadingBefore,
}

impl PathSegment {
    fn as_key(&self) -> &str {
        match self {
            PathSegment::Field(name) | PathSegment::Slot(name) => name,
            PathSegment::HeadingBefore => HEADING_BEFORE_KEY,
        }
    }
}

pub fn join_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(PathSegment::as_key)
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

/// Decompose a row name back into schema fields and list slots.
///
/// Slot keys may themselves contain the separator, so the walk is guided by
/// the schema and catalog rather than by splitting the string.
pub fn resolve_row_path(
    schema: &FieldSchemaNode,
    catalog: &OptionsCatalog,
    name: &str,
) -> Option<Vec<PathSegment>> {
    let mut path = Vec::new();
    resolve_in_fields(schema.children(), catalog, name, &mut path).then_some(path)
}

fn strip_key<'a>(remaining: &'a str, key: &str) -> Option<Option<&'a str>> {
    let rest = remaining.strip_prefix(key)?;
    if rest.is_empty() {
        return Some(None);
    }
    rest.strip_prefix(KEY_SEPARATOR).map(Some)
}

fn resolve_in_fields(
    fields: &[SchemaField],
    catalog: &OptionsCatalog,
    remaining: &str,
    path: &mut Vec<PathSegment>,
) -> bool {
    for field in fields {
        let Some(rest) = strip_key(remaining, &field.name) else {
            continue;
        };
        path.push(PathSegment::Field(field.name.clone()));

        let found = match rest {
            None => true,
            Some(HEADING_BEFORE_KEY) => {
                path.push(PathSegment::HeadingBefore);
                true
            }
            Some(rest) => match &field.node {
                FieldSchemaNode::Object(object) => {
                    resolve_in_fields(&object.fields, catalog, rest, path)
                }
                FieldSchemaNode::List(list) => resolve_in_slots(list, catalog, rest, path),
                _ => false,
            },
        };

        if found {
            return true;
        }
        path.truncate(path.len() - 1);
    }
    false
}

fn resolve_in_slots(
    list: &ListField,
    catalog: &OptionsCatalog,
    remaining: &str,
    path: &mut Vec<PathSegment>,
) -> bool {
    let Some(options) = catalog.get(&list.options_key) else {
        return false;
    };

    for option in options {
        let key = option.key.to_string();
        let Some(rest) = strip_key(remaining, &key) else {
            continue;
        };
        path.push(PathSegment::Slot(key));

        let found = match rest {
            None => true,
            Some(rest) => resolve_in_fields(&list.fields, catalog, rest, path),
        };
        if found {
            return true;
        }
        path.truncate(path.len() - 1);
    }
    false
}

/// The list slot a row sits in, used to resolve option references
#[derive(Debug, Clone)]
struct SlotContext {
    options_key: String,
    key: String,
}

struct Flattener<'a> {
    catalog: &'a OptionsCatalog,
    rows: Vec<FlattenedRow>,
    warnings: Vec<GenerationWarning>,
}

/// Walk `schema` depth-first and produce rows in reading order.
///
/// The root must be an object; any other root yields no rows.
pub fn flatten(schema: &FieldSchemaNode, catalog: &OptionsCatalog) -> Flattened {
    let mut flattener = Flattener {
        catalog,
        rows: Vec::new(),
        warnings: Vec::new(),
    };

    if let FieldSchemaNode::Object(object) = schema {
        flattener.walk_object(&object.fields, None, -1, None, &[]);
    }

    debug!(
        "Flattened schema into {} rows ({} warnings)",
        flattener.rows.len(),
        flattener.warnings.len()
    );

    Flattened {
        rows: flattener.rows,
        warnings: flattener.warnings,
    }
}

impl Flattener<'_> {
    fn walk_object(
        &mut self,
        fields: &[SchemaField],
        parent: Option<&str>,
        outline_level: i32,
        root: Option<&str>,
        context: &[SlotContext],
    ) {
        for field in fields {
            let name = combined_key(&field.name, parent);
            let root = root.unwrap_or(&field.name);
            self.walk_field(&field.node, &name, outline_level + 1, root, context);
        }
    }

    fn walk_field(
        &mut self,
        node: &FieldSchemaNode,
        name: &str,
        outline_level: i32,
        root: &str,
        context: &[SlotContext],
    ) {
        if let Some(heading) = node.meta().and_then(|meta| meta.heading_before.as_deref()) {
            self.push_heading(
                combined_key(HEADING_BEFORE_KEY, Some(name)),
                RichText::plain(heading),
                None,
                outline_level,
                root,
            );
        }

        match node {
            FieldSchemaNode::Object(object) => {
                self.walk_object(&object.fields, Some(name), outline_level, Some(root), context);
            }
            FieldSchemaNode::Heading(heading) => {
                self.push_heading(
                    name.to_string(),
                    RichText::plain(heading.label.as_str()),
                    heading.description.as_deref().map(RichText::plain),
                    outline_level,
                    root,
                );
            }
            FieldSchemaNode::Input(input) => {
                let validation = match input.validation {
                    ValidationKind::Number => Some(RowValidation::Number),
                    ValidationKind::Integer => Some(RowValidation::Integer),
                    ValidationKind::Date => Some(RowValidation::Date),
                    ValidationKind::TextArea => Some(RowValidation::TextArea),
                    ValidationKind::String | ValidationKind::Boolean => None,
                };
                self.push_input(name, &input.meta, validation, outline_level, root, context);
            }
            FieldSchemaNode::Select(select) => {
                let validation = Some(RowValidation::List {
                    options_key: select.options_key.clone(),
                });
                self.push_input(name, &select.meta, validation, outline_level, root, context);
            }
            FieldSchemaNode::List(list) => {
                self.walk_list(list, name, outline_level, root, context);
            }
        }
    }

    fn walk_list(
        &mut self,
        list: &ListField,
        name: &str,
        outline_level: i32,
        root: &str,
        context: &[SlotContext],
    ) {
        if !list.hidden_label {
            let label = self.resolve_text(&list.meta.label, name, context);
            let description = list
                .meta
                .description
                .as_ref()
                .map(|text| self.resolve_text(text, name, context));
            self.push_heading(name.to_string(), label, description, outline_level, root);
        }

        let catalog = self.catalog;
        let Some(options) = catalog.get(&list.options_key) else {
            self.warnings.push(GenerationWarning::UnresolvedOptions {
                row: name.to_string(),
                options_key: list.options_key.clone(),
            });
            return;
        };

        for option in options {
            let slot_key = option.key.to_string();
            let slot_name = combined_key(&slot_key, Some(name));

            let mut slot_context = context.to_vec();
            slot_context.push(SlotContext {
                options_key: list.options_key.clone(),
                key: slot_key,
            });

            // Slot fields nest one level deeper when a slot heading introduces them
            let fields_level = if list.slot_headings {
                self.push_heading(
                    slot_name.clone(),
                    RichText::plain(option.label.as_str()),
                    None,
                    outline_level + 1,
                    root,
                );
                outline_level + 1
            } else {
                outline_level
            };

            self.walk_object(&list.fields, Some(&slot_name), fields_level, Some(root), &slot_context);
        }
    }

    fn push_heading(
        &mut self,
        name: String,
        label: RichText,
        description: Option<RichText>,
        outline_level: i32,
        root: &str,
    ) {
        self.rows.push(FlattenedRow {
            name,
            kind: RowKind::Heading,
            outline_level: clamp_level(outline_level),
            label,
            description,
            validation: None,
            field: root.to_string(),
        });
    }

    fn push_input(
        &mut self,
        name: &str,
        meta: &FieldMeta,
        validation: Option<RowValidation>,
        outline_level: i32,
        root: &str,
        context: &[SlotContext],
    ) {
        let label = self.resolve_text(&meta.label, name, context);
        let description = meta
            .description
            .as_ref()
            .map(|text| self.resolve_text(text, name, context))
            .filter(|text| !text.is_empty());

        self.rows.push(FlattenedRow {
            name: name.to_string(),
            kind: RowKind::Input,
            outline_level: clamp_level(outline_level),
            label,
            description,
            validation,
            field: root.to_string(),
        });
    }

    fn resolve_text(&mut self, text: &RichText, row: &str, context: &[SlotContext]) -> RichText {
        let catalog = self.catalog;
        let (resolved, unresolved) =
            text.resolve(|reference| resolve_reference(catalog, context, reference));

        for reference in unresolved {
            self.warnings.push(GenerationWarning::UnresolvedReference {
                row: row.to_string(),
                reference: reference.to_string(),
            });
        }
        resolved
    }
}

fn resolve_reference(
    catalog: &OptionsCatalog,
    context: &[SlotContext],
    reference: &OptionRef,
) -> Option<String> {
    let slot = context
        .iter()
        .rev()
        .find(|slot| slot.options_key == reference.options_key)?;
    let option = catalog.find_by_key(&slot.options_key, &slot.key)?;

    match reference.attribute {
        OptionAttribute::Key => Some(option.key.to_string()),
        OptionAttribute::Label => Some(option.label.clone()),
        OptionAttribute::Description => option.description.clone(),
    }
}

fn clamp_level(level: i32) -> u8 {
    level.clamp(0, u8::MAX as i32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::options::{OptionItem, OptionsCatalogBuilder, SlotSpec};

    fn risk_catalog() -> OptionsCatalog {
        OptionsCatalogBuilder::new()
            .list("country", vec![OptionItem::new(1_i64, "Nepal")])
            .slots(&SlotSpec::new("risk_security", "risk", "Risk"))
            .build()
    }

    fn risk_schema() -> FieldSchemaNode {
        FieldSchemaNode::object(vec![
            SchemaField::select("country", "Affected Country", ValidationKind::Number, "country"),
            SchemaField::list(
                "risk_security",
                "Risk and security considerations",
                "risk_security",
                vec![
                    SchemaField::input("risk", "Risk", ValidationKind::String),
                    SchemaField::input("mitigation", "Mitigation action", ValidationKind::String),
                ],
            ),
        ])
    }

    #[test]
    fn test_list_expands_one_group_per_slot() {
        let flattened = flatten(&risk_schema(), &risk_catalog());
        let rows = &flattened.rows;
        assert!(flattened.warnings.is_empty());
        assert_eq!(rows.len(), 12);

        assert_eq!(rows[0].name, "country");
        assert_eq!(rows[0].kind, RowKind::Input);
        assert_eq!(rows[0].options_key(), Some("country"));

        assert_eq!(rows[1].name, "risk_security");
        assert_eq!(rows[1].kind, RowKind::Heading);
        assert_eq!(rows[1].outline_level, 0);

        let inputs: Vec<_> = rows[2..].iter().map(|row| row.name.as_str()).collect();
        assert_eq!(inputs[0], "risk_security__risk__0__risk");
        assert_eq!(inputs[1], "risk_security__risk__0__mitigation");
        assert_eq!(inputs[9], "risk_security__risk__4__mitigation");
        assert!(rows[2..].iter().all(|row| row.kind == RowKind::Input));
        assert!(rows[2..].iter().all(|row| row.outline_level == 1));
        assert!(rows[2..].iter().all(|row| row.field == "risk_security"));
    }

    #[test]
    fn test_slot_headings_nest_fields_one_level_deeper() {
        let schema = FieldSchemaNode::object(vec![SchemaField::list(
            "risk_security",
            "Risks",
            "risk_security",
            vec![SchemaField::input("risk", "Risk", ValidationKind::String)],
        )
        .with_slot_headings()]);

        let rows = flatten(&schema, &risk_catalog()).rows;
        assert_eq!(rows.len(), 1 + 5 * 2);
        assert_eq!(rows[1].name, "risk_security__risk__0");
        assert_eq!(rows[1].kind, RowKind::Heading);
        assert_eq!(rows[1].label.plain_text(), "Risk #1");
        assert_eq!(rows[1].outline_level, 1);
        assert_eq!(rows[2].outline_level, 2);
    }

    #[test]
    fn test_hidden_label_suppresses_list_heading_only() {
        let schema = FieldSchemaNode::object(vec![SchemaField::list(
            "risk_security",
            "Risks",
            "risk_security",
            vec![SchemaField::input("risk", "Risk", ValidationKind::String)],
        )
        .with_hidden_label()]);

        let rows = flatten(&schema, &risk_catalog()).rows;
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|row| row.kind == RowKind::Input));
    }

    #[test]
    fn test_empty_list_options_emit_heading_only() {
        let catalog = OptionsCatalogBuilder::new().list("risk_security", vec![]).build();
        let flattened = flatten(&risk_schema(), &catalog);
        let names: Vec<_> = flattened.rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["country", "risk_security"]);
    }

    #[test]
    fn test_unresolved_list_options_are_reported() {
        let catalog = OptionsCatalogBuilder::new().build();
        let flattened = flatten(&risk_schema(), &catalog);
        assert_eq!(flattened.rows.len(), 2);
        assert!(flattened.warnings.contains(&GenerationWarning::UnresolvedOptions {
            row: "risk_security".into(),
            options_key: "risk_security".into(),
        }));
    }

    #[test]
    fn test_select_with_empty_options_still_flattens() {
        let schema = FieldSchemaNode::object(vec![SchemaField::select(
            "disaster_type",
            "Type of disaster",
            ValidationKind::Number,
            "disaster_type",
        )]);
        let catalog = OptionsCatalogBuilder::new().list("disaster_type", vec![]).build();
        let rows = flatten(&schema, &catalog).rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, RowKind::Input);
        assert_eq!(rows[0].options_key(), Some("disaster_type"));
    }

    #[test]
    fn test_heading_before_precedes_field() {
        let schema = FieldSchemaNode::object(vec![
            SchemaField::input("event_date", "Date of the Event", ValidationKind::Date)
                .with_heading_before("Description of the Event"),
        ]);
        let rows = flatten(&schema, &OptionsCatalog::default()).rows;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "event_date__heading_before");
        assert_eq!(rows[0].kind, RowKind::Heading);
        assert_eq!(rows[0].outline_level, 0);
        assert_eq!(rows[0].field, "event_date");
        assert_eq!(rows[1].validation, Some(RowValidation::Date));
    }

    #[test]
    fn test_string_and_boolean_inputs_have_no_validation() {
        let schema = FieldSchemaNode::object(vec![
            SchemaField::input("title", "Title", ValidationKind::String),
            SchemaField::input("flag", "Flag", ValidationKind::Boolean),
            SchemaField::input("count", "Count", ValidationKind::Integer),
        ]);
        let rows = flatten(&schema, &OptionsCatalog::default()).rows;
        assert_eq!(rows[0].validation, None);
        assert_eq!(rows[1].validation, None);
        assert_eq!(rows[2].validation, Some(RowValidation::Integer));
    }

    #[test]
    fn test_option_reference_resolves_from_slot() {
        let catalog = OptionsCatalogBuilder::new()
            .list(
                "needs_identified",
                vec![OptionItem {
                    key: "health".into(),
                    label: "Health".into(),
                    description: Some("Healthcare services".into()),
                }],
            )
            .build();
        let schema = FieldSchemaNode::object(vec![SchemaField::list(
            "needs_identified",
            "Needs",
            "needs_identified",
            vec![SchemaField::input("description", "Description", ValidationKind::TextArea)
                .with_description(RichText::parse_markup(
                    "<ins>needs_identified.description</ins>",
                ))],
        )]);

        let flattened = flatten(&schema, &catalog);
        assert!(flattened.warnings.is_empty());
        let row = &flattened.rows[1];
        assert_eq!(row.name, "needs_identified__health__description");
        assert_eq!(
            row.description.as_ref().map(RichText::plain_text).as_deref(),
            Some("Healthcare services")
        );
    }

    #[test]
    fn test_reference_outside_slot_is_reported() {
        let schema = FieldSchemaNode::object(vec![
            SchemaField::input("note", "Note", ValidationKind::String)
                .with_description(RichText::parse_markup("<ins>needs_identified.label</ins>")),
        ]);
        let flattened = flatten(&schema, &OptionsCatalog::default());
        assert!(flattened.rows[0].description.is_none());
        assert_eq!(flattened.warnings.len(), 1);
    }

    #[test]
    fn test_row_paths_round_trip() {
        let schema = risk_schema();
        let catalog = risk_catalog();
        for row in flatten(&schema, &catalog).rows {
            let path = resolve_row_path(&schema, &catalog, &row.name)
                .unwrap_or_else(|| panic!("no path for {}", row.name));
            assert_eq!(join_path(&path), row.name);
            assert_eq!(path[0], PathSegment::Field(row.field.clone()));
        }

        let path = resolve_row_path(&schema, &catalog, "risk_security__risk__3__mitigation").unwrap();
        assert_eq!(
            path,
            vec![
                PathSegment::Field("risk_security".into()),
                PathSegment::Slot("risk__3".into()),
                PathSegment::Field("mitigation".into()),
            ]
        );
        assert!(resolve_row_path(&schema, &catalog, "risk_security__risk__9__risk").is_none());
    }

    #[test]
    fn test_split_combined_key_inverts_top_level_join() {
        let name = combined_key("risk__0__risk", Some("risk_security"));
        assert_eq!(split_combined_key(&name), ("risk_security", Some("risk__0__risk")));
        assert_eq!(split_combined_key("title"), ("title", None));
    }
}
