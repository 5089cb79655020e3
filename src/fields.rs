//! Normalization helpers for loosely-shaped API fields.
//!
//! The content API serves multilingual fields in three historical shapes:
//! a plain string, an object keyed by language code, or an array of
//! `{lang, value}` entries. Timestamps arrive as ISO-8601 strings that may
//! be missing entirely. Rendering never fails; anything unresolvable
//! becomes the `-` placeholder.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Rendered in place of missing or unresolvable values.
pub const PLACEHOLDER: &str = "-";

/// Rendered in place of a missing or unresolvable title.
pub const UNTITLED: &str = "Untitled";

/// Language preference order for multilingual fields.
const LANG_PREFERENCE: [&str; 3] = ["en", "fr", "ar"];

#[derive(Debug, Clone, Deserialize)]
pub struct LocalizedEntry {
    pub lang: String,
    pub value: String,
}

/// A multilingual field in any of the shapes the API produces.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocalizedField {
    Plain(String),
    Entries(Vec<LocalizedEntry>),
    ByLang(BTreeMap<String, String>),
    /// Anything else the API sends; renders as the placeholder
    Other(serde_json::Value),
}

impl LocalizedField {
    /// Resolve to a display value: en, then fr, then ar. Entry arrays fall
    /// back to their first entry; language maps do not.
    pub fn preferred(&self) -> Option<&str> {
        match self {
            LocalizedField::Plain(s) => (!s.is_empty()).then_some(s.as_str()),
            LocalizedField::Entries(entries) => LANG_PREFERENCE
                .iter()
                .find_map(|lang| entries.iter().find(|e| e.lang == *lang))
                .or_else(|| entries.first())
                .map(|e| e.value.as_str()),
            LocalizedField::ByLang(map) => LANG_PREFERENCE
                .iter()
                .find_map(|lang| map.get(*lang))
                .map(String::as_str),
            LocalizedField::Other(_) => None,
        }
    }

    pub fn display(&self) -> &str {
        self.preferred().unwrap_or(PLACEHOLDER)
    }
}

/// Render an optional multilingual field for terminal output.
pub fn display_field(field: Option<&LocalizedField>) -> &str {
    field.map(LocalizedField::display).unwrap_or(PLACEHOLDER)
}

/// Render an optional multilingual title; titles fall back to "Untitled"
/// rather than the dash placeholder.
pub fn display_title(field: Option<&LocalizedField>) -> &str {
    field
        .and_then(LocalizedField::preferred)
        .unwrap_or(UNTITLED)
}

/// Deserialize an identifier the API may send as a string or a number.
pub(crate) fn loose_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Deserialize a flag the API may send as a bool, "true"/"1", or 1.
/// Anything else, including null, is false.
pub(crate) fn loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Flag(flag)) => flag,
        Some(Raw::Text(s)) => s == "true" || s == "1",
        Some(Raw::Number(n)) => n.as_i64() == Some(1),
        None => false,
    })
}

/// Deserialize an optional label the API may send as a string or a number,
/// e.g. a version tag.
pub(crate) fn loose_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Render an ISO-8601 timestamp as e.g. "Jan 15, 2024". Missing or
/// unparseable input renders the placeholder.
pub fn format_date(value: Option<&str>) -> String {
    let Some(value) = value else {
        return PLACEHOLDER.to_string();
    };

    let date = value.split(['T', ' ']).next().unwrap_or("");
    let mut parts = date.splitn(3, '-');
    let year = parts.next().and_then(|p| p.parse::<i32>().ok());
    let month = parts.next().and_then(|p| p.parse::<u32>().ok());
    let day = parts.next().and_then(|p| p.parse::<u32>().ok());

    match (year, month, day) {
        (Some(year), Some(month @ 1..=12), Some(day @ 1..=31)) => {
            format!("{} {}, {}", MONTHS[(month - 1) as usize], day, year)
        }
        _ => PLACEHOLDER.to_string(),
    }
}
