//! Value fix-ups applied while reading a filled DREF template back

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::template::import::ValueHook;

static SOURCE_LINK_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^source_information__source__\d+__source_link$").expect("static source link pattern")
});

static INTERVENTION_DESCRIPTION_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^planned_interventions__[^_]+(?:_[^_]+)*__description$")
        .expect("static intervention description pattern")
});

static ASTERISK_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\n)\s*\*").expect("static bullet pattern"));

/// Prefix `https://` when a link has no scheme
pub fn normalize_link(link: &str) -> String {
    let link = link.trim();
    if link.is_empty() || link.contains("://") {
        link.to_string()
    } else {
        format!("https://{}", link)
    }
}

/// Turn lines starting with `*` into `•` bullets
pub fn normalize_bullets(text: &str) -> String {
    ASTERISK_BULLET.replace_all(text, "${1}•").into_owned()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DrefImportHooks;

impl ValueHook for DrefImportHooks {
    fn transform(&self, row_name: &str, value: Value) -> Value {
        let Value::String(text) = value else {
            return value;
        };

        if SOURCE_LINK_ROW.is_match(row_name) {
            Value::String(normalize_link(&text))
        } else if INTERVENTION_DESCRIPTION_ROW.is_match(row_name) {
            Value::String(normalize_bullets(&text))
        } else {
            Value::String(text)
        }
    }
}
