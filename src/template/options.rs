//! Options catalog: the selectable values for every `optionsKey`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Key of the fixed Yes/No option list
pub const BOOLEAN_OPTIONS_KEY: &str = "__boolean";

/// Number of synthetic slots generated for each [`SlotSpec`] unless configured otherwise
pub const DEFAULT_SLOT_COUNT: usize = 5;

/// Option keys come from several sources and keep their original type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionKey {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl OptionKey {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            OptionKey::Bool(value) => serde_json::Value::Bool(*value),
            OptionKey::Number(value) => serde_json::Value::from(*value),
            OptionKey::Text(value) => serde_json::Value::String(value.clone()),
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKey::Bool(value) => write!(f, "{}", value),
            OptionKey::Number(value) => write!(f, "{}", value),
            OptionKey::Text(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for OptionKey {
    fn from(value: &str) -> Self {
        OptionKey::Text(value.to_string())
    }
}

impl From<i64> for OptionKey {
    fn from(value: i64) -> Self {
        OptionKey::Number(value)
    }
}

impl From<bool> for OptionKey {
    fn from(value: bool) -> Self {
        OptionKey::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    pub key: OptionKey,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OptionItem {
    pub fn new(key: impl Into<OptionKey>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: None,
        }
    }
}

/// `{key, value}` pair as served by the enumeration endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub key: OptionKey,
    pub value: String,
}

/// Ordered, immutable mapping from options key to its entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsCatalog {
    lists: Vec<(String, Vec<OptionItem>)>,
}

impl OptionsCatalog {
    pub fn get(&self, options_key: &str) -> Option<&[OptionItem]> {
        self.lists
            .iter()
            .find(|(key, _)| key == options_key)
            .map(|(_, items)| items.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[OptionItem])> {
        self.lists
            .iter()
            .map(|(key, items)| (key.as_str(), items.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lists.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Entry whose key renders as `key`
    pub fn find_by_key(&self, options_key: &str, key: &str) -> Option<&OptionItem> {
        self.get(options_key)?
            .iter()
            .find(|item| item.key.to_string() == key)
    }

    /// Entry whose label is `label`, used to map a spreadsheet selection back to its key
    pub fn find_by_label(&self, options_key: &str, label: &str) -> Option<&OptionItem> {
        self.get(options_key)?.iter().find(|item| item.label == label)
    }
}

/// Fixed-size list of numbered placeholders such as "Source #1" .. "Source #5"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSpec {
    pub options_key: String,
    pub key_prefix: String,
    pub label_prefix: String,
}

impl SlotSpec {
    pub fn new(options_key: &str, key_prefix: &str, label_prefix: &str) -> Self {
        Self {
            options_key: options_key.to_string(),
            key_prefix: key_prefix.to_string(),
            label_prefix: label_prefix.to_string(),
        }
    }

    pub fn items(&self, count: usize) -> Vec<OptionItem> {
        (0..count)
            .map(|index| {
                OptionItem::new(
                    format!("{}__{}", self.key_prefix, index).as_str(),
                    format!("{} #{}", self.label_prefix, index + 1),
                )
            })
            .collect()
    }
}

pub fn boolean_options() -> Vec<OptionItem> {
    vec![OptionItem::new(true, "Yes"), OptionItem::new(false, "No")]
}

#[derive(Debug, Clone)]
pub struct OptionsCatalogBuilder {
    lists: Vec<(String, Vec<OptionItem>)>,
    slot_count: usize,
}

impl Default for OptionsCatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionsCatalogBuilder {
    /// Start a catalog that already holds the Yes/No list
    pub fn new() -> Self {
        let mut builder = Self {
            lists: Vec::new(),
            slot_count: DEFAULT_SLOT_COUNT,
        };
        builder.insert(BOOLEAN_OPTIONS_KEY, boolean_options());
        builder
    }

    pub fn slot_count(mut self, count: usize) -> Self {
        self.slot_count = count;
        self
    }

    pub fn list(mut self, options_key: &str, items: Vec<OptionItem>) -> Self {
        self.insert(options_key, items);
        self
    }

    /// Add an enumeration; a missing response becomes an empty list
    pub fn enumeration(self, options_key: &str, values: Option<&[EnumValue]>) -> Self {
        self.enumeration_with_descriptions(options_key, values, &HashMap::new())
    }

    pub fn enumeration_with_descriptions(
        mut self,
        options_key: &str,
        values: Option<&[EnumValue]>,
        descriptions: &HashMap<String, String>,
    ) -> Self {
        let items = values
            .unwrap_or_default()
            .iter()
            .map(|value| OptionItem {
                key: value.key.clone(),
                label: value.value.clone(),
                description: descriptions.get(&value.key.to_string()).cloned(),
            })
            .collect();
        self.insert(options_key, items);
        self
    }

    pub fn slots(mut self, spec: &SlotSpec) -> Self {
        let items = spec.items(self.slot_count);
        self.insert(&spec.options_key, items);
        self
    }

    pub fn build(self) -> OptionsCatalog {
        OptionsCatalog { lists: self.lists }
    }

    fn insert(&mut self, options_key: &str, items: Vec<OptionItem>) {
        match self.lists.iter_mut().find(|(key, _)| key == options_key) {
            Some((_, existing)) => *existing = items,
            None => self.lists.push((options_key.to_string(), items)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_list_is_always_present() {
        let catalog = OptionsCatalogBuilder::new().build();
        let options = catalog.get(BOOLEAN_OPTIONS_KEY).unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].key, OptionKey::Bool(true));
        assert_eq!(options[0].label, "Yes");
        assert_eq!(options[1].label, "No");
    }

    #[test]
    fn test_slots_have_fixed_cardinality() {
        let spec = SlotSpec::new("source_information", "source", "Source");
        let catalog = OptionsCatalogBuilder::new().slots(&spec).build();
        let options = catalog.get("source_information").unwrap();
        assert_eq!(options.len(), DEFAULT_SLOT_COUNT);
        assert_eq!(options[0].key, OptionKey::Text("source__0".into()));
        assert_eq!(options[4].label, "Source #5");
    }

    #[test]
    fn test_slot_count_is_configurable() {
        let spec = SlotSpec::new("risk_security", "risk", "Risk");
        let catalog = OptionsCatalogBuilder::new().slot_count(3).slots(&spec).build();
        assert_eq!(catalog.get("risk_security").unwrap().len(), 3);
    }

    #[test]
    fn test_missing_enumeration_degrades_to_empty_list() {
        let catalog = OptionsCatalogBuilder::new()
            .enumeration("type_of_onset", None)
            .build();
        assert_eq!(catalog.get("type_of_onset"), Some(&[][..]));
    }

    #[test]
    fn test_enumeration_descriptions_are_attached_by_key() {
        let values = vec![
            EnumValue { key: "health".into(), value: "Health".into() },
            EnumValue { key: "other".into(), value: "Other".into() },
        ];
        let descriptions =
            HashMap::from([("health".to_string(), "Healthcare services".to_string())]);
        let catalog = OptionsCatalogBuilder::new()
            .enumeration_with_descriptions("needs_identified", Some(&values), &descriptions)
            .build();

        let health = catalog.find_by_key("needs_identified", "health").unwrap();
        assert_eq!(health.description.as_deref(), Some("Healthcare services"));
        assert!(catalog.find_by_label("needs_identified", "Other").unwrap().description.is_none());
    }

    #[test]
    fn test_catalog_keeps_insertion_order_and_replaces_duplicates() {
        let catalog = OptionsCatalogBuilder::new()
            .list("country", vec![OptionItem::new(1_i64, "Nepal")])
            .list("disaster_type", vec![])
            .list("country", vec![OptionItem::new(2_i64, "Kenya")])
            .build();
        let keys: Vec<_> = catalog.keys().collect();
        assert_eq!(keys, vec![BOOLEAN_OPTIONS_KEY, "country", "disaster_type"]);
        assert_eq!(catalog.get("country").unwrap()[0].label, "Kenya");
    }

    #[test]
    fn test_untagged_keys_keep_their_type() {
        let values: Vec<EnumValue> =
            serde_json::from_str(r#"[{"key": 0, "value": "Imminent"}, {"key": "a", "value": "A"}]"#)
                .unwrap();
        assert_eq!(values[0].key, OptionKey::Number(0));
        assert_eq!(values[1].key, OptionKey::Text("a".into()));
    }
}
