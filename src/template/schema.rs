//! Declarative description of a form, the input to template generation.
//!
//! The core model ([`FieldSchemaNode`]) carries parsed [`RichText`]. Template
//! assets are written as JSON ([`NodeDefinition`]) and converted with
//! [`load_schema`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::rich_text::RichText;

/// Kind of value a leaf field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationKind {
    String,
    Number,
    Integer,
    Boolean,
    Date,
    TextArea,
}

/// Text shared by every labelled field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMeta {
    pub label: RichText,
    pub description: Option<RichText>,
    /// Section heading emitted right before the field
    pub heading_before: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectField {
    pub fields: Vec<SchemaField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    pub meta: FieldMeta,
    pub validation: ValidationKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectField {
    pub meta: FieldMeta,
    pub validation: ValidationKind,
    pub options_key: String,
}

/// Repeated group of fields, one repetition per catalog entry of `options_key`
#[derive(Debug, Clone, PartialEq)]
pub struct ListField {
    pub meta: FieldMeta,
    pub options_key: String,
    /// Field that receives the slot key when values are read back
    pub key_field_name: Option<String>,
    pub hidden_label: bool,
    /// Emit a heading row introducing each repetition
    pub slot_headings: bool,
    pub fields: Vec<SchemaField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadingField {
    pub label: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldSchemaNode {
    Object(ObjectField),
    Input(InputField),
    Select(SelectField),
    List(ListField),
    Heading(HeadingField),
}

/// A named child of an object or list
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub node: FieldSchemaNode,
}

impl FieldSchemaNode {
    pub fn object(fields: Vec<SchemaField>) -> Self {
        FieldSchemaNode::Object(ObjectField { fields })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldSchemaNode::Object(_) => "object",
            FieldSchemaNode::Input(_) => "input",
            FieldSchemaNode::Select(_) => "select",
            FieldSchemaNode::List(_) => "list",
            FieldSchemaNode::Heading(_) => "heading",
        }
    }

    pub fn meta(&self) -> Option<&FieldMeta> {
        match self {
            FieldSchemaNode::Input(field) => Some(&field.meta),
            FieldSchemaNode::Select(field) => Some(&field.meta),
            FieldSchemaNode::List(field) => Some(&field.meta),
            FieldSchemaNode::Object(_) | FieldSchemaNode::Heading(_) => None,
        }
    }

    fn meta_mut(&mut self) -> Option<&mut FieldMeta> {
        match self {
            FieldSchemaNode::Input(field) => Some(&mut field.meta),
            FieldSchemaNode::Select(field) => Some(&mut field.meta),
            FieldSchemaNode::List(field) => Some(&mut field.meta),
            FieldSchemaNode::Object(_) | FieldSchemaNode::Heading(_) => None,
        }
    }

    /// Children of an object or the item fields of a list
    pub fn children(&self) -> &[SchemaField] {
        match self {
            FieldSchemaNode::Object(object) => &object.fields,
            FieldSchemaNode::List(list) => &list.fields,
            _ => &[],
        }
    }

    /// Every options key referenced anywhere below this node
    pub fn options_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        self.collect_options_keys(&mut keys);
        keys
    }

    fn collect_options_keys<'a>(&'a self, keys: &mut Vec<&'a str>) {
        match self {
            FieldSchemaNode::Select(select) => keys.push(&select.options_key),
            FieldSchemaNode::List(list) => keys.push(&list.options_key),
            _ => {}
        }
        for child in self.children() {
            child.node.collect_options_keys(keys);
        }
    }
}

impl SchemaField {
    pub fn input(name: &str, label: impl Into<RichText>, validation: ValidationKind) -> Self {
        Self {
            name: name.to_string(),
            node: FieldSchemaNode::Input(InputField {
                meta: FieldMeta {
                    label: label.into(),
                    ..FieldMeta::default()
                },
                validation,
            }),
        }
    }

    pub fn select(
        name: &str,
        label: impl Into<RichText>,
        validation: ValidationKind,
        options_key: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            node: FieldSchemaNode::Select(SelectField {
                meta: FieldMeta {
                    label: label.into(),
                    ..FieldMeta::default()
                },
                validation,
                options_key: options_key.to_string(),
            }),
        }
    }

    pub fn list(
        name: &str,
        label: impl Into<RichText>,
        options_key: &str,
        fields: Vec<SchemaField>,
    ) -> Self {
        Self {
            name: name.to_string(),
            node: FieldSchemaNode::List(ListField {
                meta: FieldMeta {
                    label: label.into(),
                    ..FieldMeta::default()
                },
                options_key: options_key.to_string(),
                key_field_name: None,
                hidden_label: false,
                slot_headings: false,
                fields,
            }),
        }
    }

    pub fn object(name: &str, fields: Vec<SchemaField>) -> Self {
        Self {
            name: name.to_string(),
            node: FieldSchemaNode::object(fields),
        }
    }

    pub fn heading(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            node: FieldSchemaNode::Heading(HeadingField {
                label: label.to_string(),
                description: None,
            }),
        }
    }

    pub fn with_description(mut self, description: impl Into<RichText>) -> Self {
        if let Some(meta) = self.node.meta_mut() {
            meta.description = Some(description.into());
        }
        self
    }

    pub fn with_heading_before(mut self, heading: &str) -> Self {
        if let Some(meta) = self.node.meta_mut() {
            meta.heading_before = Some(heading.to_string());
        }
        self
    }

    pub fn with_hidden_label(mut self) -> Self {
        if let FieldSchemaNode::List(list) = &mut self.node {
            list.hidden_label = true;
        }
        self
    }

    pub fn with_slot_headings(mut self) -> Self {
        if let FieldSchemaNode::List(list) = &mut self.node {
            list.slot_headings = true;
        }
        self
    }

    pub fn with_key_field(mut self, key_field_name: &str) -> Self {
        if let FieldSchemaNode::List(list) = &mut self.node {
            list.key_field_name = Some(key_field_name.to_string());
        }
        self
    }
}

// Asset format

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeDefinition {
    Object(ObjectDefinition),
    Input(InputDefinition),
    Select(SelectDefinition),
    List(ListDefinition),
    Heading(HeadingDefinition),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedDefinition {
    pub name: String,
    #[serde(flatten)]
    pub node: NodeDefinition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDefinition {
    pub fields: Vec<NamedDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDefinition {
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub heading_before: Option<String>,
    pub validation: ValidationKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectDefinition {
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub heading_before: Option<String>,
    pub validation: ValidationKind,
    pub options_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDefinition {
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub heading_before: Option<String>,
    pub options_key: String,
    #[serde(default)]
    pub key_field_name: Option<String>,
    #[serde(default)]
    pub hidden_label: bool,
    #[serde(default)]
    pub slot_headings: bool,
    pub fields: Vec<NamedDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingDefinition {
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn meta_from(label: &str, description: Option<&str>, heading_before: Option<String>) -> FieldMeta {
    FieldMeta {
        label: RichText::parse_markup(label),
        description: description
            .map(RichText::parse_markup)
            .filter(|text| !text.is_empty()),
        heading_before,
    }
}

fn convert_fields(fields: Vec<NamedDefinition>) -> Vec<SchemaField> {
    fields
        .into_iter()
        .map(|field| SchemaField {
            name: field.name,
            node: field.node.into(),
        })
        .collect()
}

impl From<NodeDefinition> for FieldSchemaNode {
    fn from(definition: NodeDefinition) -> Self {
        match definition {
            NodeDefinition::Object(object) => FieldSchemaNode::object(convert_fields(object.fields)),
            NodeDefinition::Input(input) => FieldSchemaNode::Input(InputField {
                meta: meta_from(&input.label, input.description.as_deref(), input.heading_before),
                validation: input.validation,
            }),
            NodeDefinition::Select(select) => FieldSchemaNode::Select(SelectField {
                meta: meta_from(&select.label, select.description.as_deref(), select.heading_before),
                validation: select.validation,
                options_key: select.options_key,
            }),
            NodeDefinition::List(list) => FieldSchemaNode::List(ListField {
                meta: meta_from(&list.label, list.description.as_deref(), list.heading_before),
                options_key: list.options_key,
                key_field_name: list.key_field_name,
                hidden_label: list.hidden_label,
                slot_headings: list.slot_headings,
                fields: convert_fields(list.fields),
            }),
            NodeDefinition::Heading(heading) => FieldSchemaNode::Heading(HeadingField {
                label: heading.label,
                description: heading.description,
            }),
        }
    }
}

/// Parse a JSON schema asset. The root must be an object node.
pub fn load_schema(json: &str) -> Result<FieldSchemaNode> {
    let definition: NodeDefinition =
        serde_json::from_str(json).context("Failed to parse template schema")?;

    if !matches!(definition, NodeDefinition::Object(_)) {
        anyhow::bail!("Template schema root must be an object node");
    }

    Ok(definition.into())
}
