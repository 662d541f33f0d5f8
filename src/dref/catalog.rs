//! Options catalog of the DREF template

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::schema::embedded_descriptions;
use crate::api::models::ReferenceData;
use crate::template::options::{OptionsCatalog, OptionsCatalogBuilder, SlotSpec};

pub const NATIONAL_SOCIETY: &str = "national_society";
pub const COUNTRY: &str = "country";
pub const DISASTER_TYPE: &str = "disaster_type";
pub const TYPE_OF_ONSET: &str = "type_of_onset";
pub const DISASTER_CATEGORY: &str = "disaster_category";
pub const PLANNED_INTERVENTIONS: &str = "planned_interventions";
pub const NATIONAL_SOCIETY_ACTIONS: &str = "national_society_actions";
pub const NEEDS_IDENTIFIED: &str = "needs_identified";
pub const SOURCE_INFORMATION: &str = "source_information";
pub const PLANNED_INTERVENTIONS_INDICATORS: &str = "planned_interventions_indicators";
pub const RISK_SECURITY: &str = "risk_security";

/// Sector help text keyed by enumeration key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorDescriptions {
    #[serde(default)]
    pub national_society_actions: HashMap<String, String>,
    #[serde(default)]
    pub needs_identified: HashMap<String, String>,
}

impl SectorDescriptions {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse sector descriptions")
    }

    pub fn embedded() -> Result<Self> {
        Self::from_toml(embedded_descriptions()?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sector descriptions: {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("In {:?}", path))
    }

    /// Descriptions from `path` when given, the bundled ones otherwise
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::embedded(),
        }
    }
}

/// Numbered placeholders for lists whose entries the user names freely
pub fn dref_slot_specs() -> [SlotSpec; 3] {
    [
        SlotSpec::new(SOURCE_INFORMATION, "source", "Source"),
        SlotSpec::new(PLANNED_INTERVENTIONS_INDICATORS, "indicator", "Indicator"),
        SlotSpec::new(RISK_SECURITY, "risk", "Risk"),
    ]
}

pub fn build_dref_catalog(
    reference: &ReferenceData,
    descriptions: &SectorDescriptions,
    slot_count: usize,
) -> OptionsCatalog {
    let enums = &reference.global_enums;

    let mut builder = OptionsCatalogBuilder::new()
        .slot_count(slot_count)
        .list(NATIONAL_SOCIETY, reference.national_society_options())
        .list(COUNTRY, reference.country_options())
        .list(DISASTER_TYPE, reference.disaster_type_options())
        .enumeration(TYPE_OF_ONSET, enums.dref_dref_onset_type.as_deref())
        .enumeration(DISASTER_CATEGORY, enums.dref_dref_disaster_category.as_deref())
        .enumeration(PLANNED_INTERVENTIONS, enums.dref_planned_intervention_title.as_deref());

    for spec in dref_slot_specs() {
        builder = builder.slots(&spec);
    }

    builder
        .enumeration_with_descriptions(
            NATIONAL_SOCIETY_ACTIONS,
            enums.dref_national_society_action_title.as_deref(),
            &descriptions.national_society_actions,
        )
        .enumeration_with_descriptions(
            NEEDS_IDENTIFIED,
            enums.dref_identified_need_title.as_deref(),
            &descriptions.needs_identified,
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::GlobalEnums;
    use crate::template::options::{BOOLEAN_OPTIONS_KEY, EnumValue, OptionKey};

    fn enum_values(pairs: &[(&str, &str)]) -> Vec<EnumValue> {
        pairs
            .iter()
            .map(|(key, value)| EnumValue {
                key: OptionKey::from(*key),
                value: value.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_missing_enumerations_become_empty_lists() {
        let catalog = build_dref_catalog(
            &ReferenceData::default(),
            &SectorDescriptions::default(),
            5,
        );

        assert_eq!(catalog.get(BOOLEAN_OPTIONS_KEY).unwrap().len(), 2);
        assert_eq!(catalog.get(TYPE_OF_ONSET), Some(&[][..]));
        assert_eq!(catalog.get(NEEDS_IDENTIFIED), Some(&[][..]));
        for key in [SOURCE_INFORMATION, PLANNED_INTERVENTIONS_INDICATORS, RISK_SECURITY] {
            assert_eq!(catalog.get(key).unwrap().len(), 5, "{}", key);
        }
        assert_eq!(
            catalog.find_by_key(RISK_SECURITY, "risk__4").unwrap().label,
            "Risk #5"
        );
    }

    #[test]
    fn test_sector_descriptions_are_attached() {
        let reference = ReferenceData {
            global_enums: GlobalEnums {
                dref_national_society_action_title: Some(enum_values(&[
                    ("health", "Health"),
                    ("unknown_sector", "Unknown"),
                ])),
                ..GlobalEnums::default()
            },
            ..ReferenceData::default()
        };
        let descriptions = SectorDescriptions::embedded().unwrap();
        let catalog = build_dref_catalog(&reference, &descriptions, 5);

        let actions = catalog.get(NATIONAL_SOCIETY_ACTIONS).unwrap();
        assert!(actions[0].description.as_deref().unwrap().starts_with("Healthcare services"));
        assert!(actions[1].description.is_none());
    }

    #[test]
    fn test_every_schema_options_key_is_in_catalog() {
        let schema = crate::dref::schema::dref_schema().unwrap();
        let catalog = build_dref_catalog(&ReferenceData::default(), &SectorDescriptions::default(), 5);
        for key in schema.options_keys() {
            assert!(catalog.get(key).is_some(), "missing options key {}", key);
        }
    }

    #[test]
    fn test_descriptions_override_file() {
        let descriptions = SectorDescriptions::from_toml(
            "[needs_identified]\nshelter = \"Custom text\"\n",
        )
        .unwrap();
        assert_eq!(descriptions.needs_identified["shelter"], "Custom text");
        assert!(descriptions.national_society_actions.is_empty());
        assert!(SectorDescriptions::from_toml("needs_identified = 3").is_err());
    }
}
