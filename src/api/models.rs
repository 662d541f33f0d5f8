//! Reference data served by the GO API

use serde::{Deserialize, Serialize};

use crate::template::options::{EnumValue, OptionItem, OptionKey};

/// `record_type` of a plain country (as opposed to regions or clusters)
pub const COUNTRY_RECORD_TYPE: i64 = 1;

/// The slice of `/api/v2/global-enums/` the DREF template uses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalEnums {
    #[serde(default)]
    pub dref_planned_intervention_title: Option<Vec<EnumValue>>,
    #[serde(default)]
    pub dref_national_society_action_title: Option<Vec<EnumValue>>,
    #[serde(default)]
    pub dref_identified_need_title: Option<Vec<EnumValue>>,
    #[serde(default)]
    pub dref_dref_onset_type: Option<Vec<EnumValue>>,
    #[serde(default)]
    pub dref_dref_disaster_category: Option<Vec<EnumValue>>,
    #[serde(default)]
    pub dref_dref_dref_type: Option<Vec<EnumValue>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub society_name: Option<String>,
    #[serde(default)]
    pub independent: Option<bool>,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub record_type: Option<i64>,
}

impl Country {
    /// Independent, current, plain country records
    pub fn is_selectable(&self) -> bool {
        !self.is_deprecated
            && self.independent.unwrap_or(true)
            && self.record_type.is_none_or(|kind| kind == COUNTRY_RECORD_TYPE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisasterType {
    pub id: i64,
    pub name: String,
}

/// Page of a list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<T>,
}

/// Everything the options catalog is built from, fetched once per generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub global_enums: GlobalEnums,
    #[serde(default)]
    pub countries: Vec<Country>,
    #[serde(default)]
    pub disaster_types: Vec<DisasterType>,
}

impl ReferenceData {
    /// National societies keyed by their country id
    pub fn national_society_options(&self) -> Vec<OptionItem> {
        self.countries
            .iter()
            .filter(|country| country.is_selectable())
            .filter_map(|country| {
                let society = country.society_name.as_deref()?.trim();
                (!society.is_empty()).then(|| OptionItem::new(country.id, society))
            })
            .collect()
    }

    pub fn country_options(&self) -> Vec<OptionItem> {
        self.countries
            .iter()
            .filter(|country| country.is_selectable())
            .filter_map(|country| {
                let name = country.name.as_deref()?.trim();
                (!name.is_empty()).then(|| OptionItem::new(country.id, name))
            })
            .collect()
    }

    pub fn disaster_type_options(&self) -> Vec<OptionItem> {
        self.disaster_types
            .iter()
            .map(|disaster| OptionItem::new(disaster.id, disaster.name.as_str()))
            .collect()
    }

    /// Display label of a DREF type code, if the enumeration knows it
    pub fn dref_type_label(&self, dref_type: i64) -> Option<&str> {
        self.global_enums
            .dref_dref_dref_type
            .as_deref()?
            .iter()
            .find(|value| value.key == OptionKey::Number(dref_type))
            .map(|value| value.value.as_str())
    }
}
