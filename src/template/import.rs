//! Reading a filled template back into a nested form value.
//!
//! Every Value cell of a generated template carries a workbook-level defined
//! name equal to its row name, so the reader only has to resolve names to
//! cells and walk the schema again.

use anyhow::{Context, Result, bail};
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use chrono::NaiveDate;
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use super::flatten::combined_key;
use super::options::OptionsCatalog;
use super::render::cover::CellRange;
use super::render::names::sanitize_defined_name;
use super::schema::{FieldSchemaNode, ListField, SchemaField, ValidationKind};

/// Field added to every list item so clients can track it
pub const CLIENT_ID_FIELD: &str = "client_id";

/// A non-empty cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    fn from_data(data: &Data) -> Option<Self> {
        match data {
            Data::String(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| CellValue::Text(text.to_string()))
            }
            Data::Float(value) => Some(CellValue::Number(*value)),
            Data::Int(value) => Some(CellValue::Number(*value as f64)),
            Data::Bool(value) => Some(CellValue::Bool(*value)),
            Data::DateTime(value) => serial_to_date(value.as_f64()).map(CellValue::Date),
            Data::DateTimeIso(value) => Some(
                NaiveDate::parse_from_str(value.get(..10).unwrap_or(value.as_str()), "%Y-%m-%d")
                    .map(CellValue::Date)
                    .unwrap_or_else(|_| CellValue::Text(value.clone())),
            ),
            Data::DurationIso(value) => Some(CellValue::Text(value.clone())),
            _ => None,
        }
    }

    /// Text as shown in the cell, used to match dropdown labels
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Number(value) => format_number(*value),
            CellValue::Bool(true) => "Yes".to_string(),
            CellValue::Bool(false) => "No".to_string(),
            CellValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Excel serial day to calendar date (1900 date system)
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(chrono::Duration::days(serial.floor() as i64))
}

/// Values of a filled template keyed by defined name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    values: HashMap<String, CellValue>,
}

impl FormValues {
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.values
            .get(name)
            .or_else(|| self.values.get(&sanitize_defined_name(name)))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: CellValue) {
        self.values.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, CellValue)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Split `'Sheet Name'!$B$5` into sheet name and zero-based cell
fn parse_reference(reference: &str) -> Result<(String, u32, u16)> {
    let reference = reference.trim().trim_start_matches('=');
    let (sheet, cell) = reference
        .rsplit_once('!')
        .with_context(|| format!("Reference '{}' has no sheet", reference))?;

    let sheet = match sheet.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        Some(quoted) => quoted.replace("''", "'"),
        None => sheet.to_string(),
    };

    let range = CellRange::parse(&cell.replace('$', ""))?;
    if !range.is_single_cell() {
        bail!("Reference '{}' is not a single cell", reference);
    }
    Ok((sheet, range.first_row, range.first_col))
}

fn read_values<R>(workbook: &mut Xlsx<R>) -> Result<FormValues>
where
    R: std::io::Read + std::io::Seek,
{
    let names = workbook.defined_names().to_vec();
    let mut sheets: HashMap<String, Range<Data>> = HashMap::new();
    let mut values = FormValues::default();

    for (name, reference) in names {
        let (sheet, row, col) = match parse_reference(&reference) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Skipping defined name '{}': {}", name, e);
                continue;
            }
        };

        if !sheets.contains_key(&sheet) {
            let range = workbook
                .worksheet_range(&sheet)
                .with_context(|| format!("Error reading sheet '{}'", sheet))?;
            sheets.insert(sheet.clone(), range);
        }

        let cell = sheets
            .get(&sheet)
            .and_then(|range| range.get_value((row, u32::from(col))))
            .and_then(CellValue::from_data);
        if let Some(value) = cell {
            values.insert(name, value);
        }
    }

    debug!("Read {} filled cells from template", values.len());
    Ok(values)
}

/// Read every named, non-empty cell of a filled template
pub fn read_form_values(path: &Path) -> Result<FormValues> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open template: {}", path.display()))?;
    read_values(&mut workbook)
}

pub fn read_form_values_from_bytes(bytes: &[u8]) -> Result<FormValues> {
    let mut workbook =
        Xlsx::new(Cursor::new(bytes.to_vec())).context("Failed to open template workbook")?;
    read_values(&mut workbook)
}

/// Adjusts a value read from a named row before it is placed in the result
pub trait ValueHook {
    fn transform(&self, row_name: &str, value: Value) -> Value;
}

/// Leaves every value untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl ValueHook for NoHooks {
    fn transform(&self, _row_name: &str, value: Value) -> Value {
        value
    }
}

struct ValueBuilder<'a, H: ValueHook + ?Sized> {
    catalog: &'a OptionsCatalog,
    values: &'a FormValues,
    hooks: &'a H,
}

/// Rebuild the nested form value described by `schema`.
///
/// Empty objects and lists are left out; selects map the chosen label back
/// to its option key, and list items gain their slot key plus a client id.
pub fn value_from_template<H: ValueHook + ?Sized>(
    schema: &FieldSchemaNode,
    catalog: &OptionsCatalog,
    values: &FormValues,
    hooks: &H,
) -> Value {
    let builder = ValueBuilder {
        catalog,
        values,
        hooks,
    };
    Value::Object(builder.object(schema.children(), None))
}

impl<H: ValueHook + ?Sized> ValueBuilder<'_, H> {
    fn object(&self, fields: &[SchemaField], parent: Option<&str>) -> Map<String, Value> {
        let mut object = Map::new();
        for field in fields {
            let name = combined_key(&field.name, parent);
            if let Some(value) = self.field(&field.node, &name) {
                object.insert(field.name.clone(), value);
            }
        }
        object
    }

    fn field(&self, node: &FieldSchemaNode, name: &str) -> Option<Value> {
        match node {
            FieldSchemaNode::Object(object) => {
                let value = self.object(&object.fields, Some(name));
                (!value.is_empty()).then_some(Value::Object(value))
            }
            FieldSchemaNode::Input(input) => {
                let cell = self.values.get(name)?;
                let value = input_value(cell, input.validation);
                Some(self.hooks.transform(name, value))
            }
            FieldSchemaNode::Select(select) => {
                let label = self.values.get(name)?.display_text();
                match self.catalog.find_by_label(&select.options_key, &label) {
                    Some(option) => Some(option.key.to_json()),
                    None => {
                        warn!(
                            "'{}' is not an option of '{}' (row {})",
                            label, select.options_key, name
                        );
                        None
                    }
                }
            }
            FieldSchemaNode::List(list) => self.list(list, name),
            FieldSchemaNode::Heading(_) => None,
        }
    }

    fn list(&self, list: &ListField, name: &str) -> Option<Value> {
        let options = self.catalog.get(&list.options_key)?;

        let items: Vec<Value> = options
            .iter()
            .filter_map(|option| {
                let slot_name = combined_key(&option.key.to_string(), Some(name));
                let mut item = self.object(&list.fields, Some(&slot_name));
                if item.is_empty() {
                    return None;
                }
                if let Some(key_field) = &list.key_field_name {
                    item.insert(key_field.clone(), option.key.to_json());
                }
                item.insert(
                    CLIENT_ID_FIELD.to_string(),
                    Value::String(uuid::Uuid::new_v4().to_string()),
                );
                Some(Value::Object(item))
            })
            .collect();

        (!items.is_empty()).then_some(Value::Array(items))
    }
}

fn input_value(cell: &CellValue, validation: ValidationKind) -> Value {
    match (validation, cell) {
        (ValidationKind::Number, CellValue::Number(value)) => number_value(*value),
        (ValidationKind::Number, CellValue::Text(text)) => text
            .parse::<f64>()
            .map(number_value)
            .unwrap_or_else(|_| Value::String(text.clone())),
        (ValidationKind::Integer, CellValue::Number(value)) if value.fract() == 0.0 => {
            Value::from(*value as i64)
        }
        (ValidationKind::Integer, CellValue::Text(text)) => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(text.clone())),
        (ValidationKind::Date, CellValue::Number(serial)) => serial_to_date(*serial)
            .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        (ValidationKind::Boolean, CellValue::Bool(value)) => Value::Bool(*value),
        (ValidationKind::Boolean, CellValue::Text(text)) => {
            match text.to_ascii_lowercase().as_str() {
                "yes" | "true" => Value::Bool(true),
                "no" | "false" => Value::Bool(false),
                _ => Value::String(text.clone()),
            }
        }
        (_, CellValue::Number(value)) => number_value(*value),
        (_, cell) => Value::String(cell.display_text()),
    }
}

fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::options::{OptionItem, OptionsCatalogBuilder, SlotSpec};

    fn schema() -> FieldSchemaNode {
        FieldSchemaNode::object(vec![
            SchemaField::select("country", "Country", ValidationKind::Number, "country"),
            SchemaField::input("title", "Title", ValidationKind::String),
            SchemaField::input("num_affected", "Affected", ValidationKind::Integer),
            SchemaField::input("event_date", "Date", ValidationKind::Date),
            SchemaField::list(
                "risk_security",
                "Risks",
                "risk_security",
                vec![
                    SchemaField::input("risk", "Risk", ValidationKind::String),
                    SchemaField::input("mitigation", "Mitigation", ValidationKind::String),
                ],
            ),
        ])
    }

    fn catalog() -> OptionsCatalog {
        OptionsCatalogBuilder::new()
            .list("country", vec![OptionItem::new(42_i64, "Nepal")])
            .slots(&SlotSpec::new("risk_security", "risk", "Risk"))
            .build()
    }

    #[test]
    fn test_values_are_rebuilt_into_nested_form() {
        let values: FormValues = [
            ("country".to_string(), CellValue::Text("Nepal".into())),
            ("title".to_string(), CellValue::Text("Floods".into())),
            ("num_affected".to_string(), CellValue::Number(1200.0)),
            ("event_date".to_string(), CellValue::Number(45292.0)),
            (
                "risk_security__risk__1__risk".to_string(),
                CellValue::Text("Landslides".into()),
            ),
        ]
        .into_iter()
        .collect();

        let value = value_from_template(&schema(), &catalog(), &values, &NoHooks);
        assert_eq!(value["country"], Value::from(42));
        assert_eq!(value["title"], "Floods");
        assert_eq!(value["num_affected"], Value::from(1200));
        assert_eq!(value["event_date"], "2024-01-01");

        let risks = value["risk_security"].as_array().unwrap();
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0]["risk"], "Landslides");
        assert!(risks[0].get("mitigation").is_none());
        assert!(risks[0][CLIENT_ID_FIELD].is_string());
    }

    #[test]
    fn test_empty_lists_and_unknown_labels_are_omitted() {
        let values: FormValues = [("country".to_string(), CellValue::Text("Atlantis".into()))]
            .into_iter()
            .collect();
        let value = value_from_template(&schema(), &catalog(), &values, &NoHooks);
        assert_eq!(value, Value::Object(Map::new()));
    }

    #[test]
    fn test_parse_reference() {
        assert_eq!(
            parse_reference("'Operation Overview'!$B$5").unwrap(),
            ("Operation Overview".to_string(), 4, 1)
        );
        assert_eq!(parse_reference("=options!$C$2").unwrap(), ("options".to_string(), 1, 2));
        assert!(parse_reference("options!$C$2:$C$4").is_err());
        assert!(parse_reference("nothing").is_err());
        assert!(parse_reference("Sheet1!$ZZZZZZZZZZ$1").is_err());
    }

    #[test]
    fn test_serial_dates() {
        assert_eq!(serial_to_date(45292.0), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(serial_to_date(25569.5), NaiveDate::from_ymd_opt(1970, 1, 1));
        assert_eq!(serial_to_date(-1.0), None);
    }

    #[test]
    fn test_cell_display_text() {
        assert_eq!(CellValue::Number(3.0).display_text(), "3");
        assert_eq!(CellValue::Number(2.5).display_text(), "2.5");
        assert_eq!(CellValue::Bool(true).display_text(), "Yes");
    }
}
