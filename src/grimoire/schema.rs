//! # Custom Field Schema
//!
//! Every [`Collection`] declares an ordered list of typed fields, and every
//! [`Entry`] carries an open `custom` map keyed by field key. There is no
//! per-type code generation: a single routine keyed on [`FieldType`] coerces,
//! validates and displays values for any field.
//!
//! Missing keys are empty, never errors. Keys the schema does not know are kept
//! untouched (they may belong to a field that was removed from the collection).

use crate::model::{Collection, CollectionField, Entry, FieldType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
const SUBTITLE_SEPARATOR: &str = " • ";

/// A scalar custom-field value, stored as plain JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CustomValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CustomValue::Null => true,
            CustomValue::Text(s) => s.trim().is_empty(),
            CustomValue::Bool(_) | CustomValue::Number(_) => false,
        }
    }
}

impl fmt::Display for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomValue::Null => Ok(()),
            CustomValue::Bool(b) => write!(f, "{}", b),
            CustomValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CustomValue::Number(n) => write!(f, "{}", n),
            CustomValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CustomValue {
    fn from(s: &str) -> Self {
        CustomValue::Text(s.to_string())
    }
}

impl From<f64> for CustomValue {
    fn from(n: f64) -> Self {
        CustomValue::Number(n)
    }
}

/// Why a value does not fit its field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldIssue {
    #[error("expected a {0:?} value")]
    TypeMismatch(FieldType),

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("'{value}' is not one of: {options}")]
    NotAnOption { value: String, options: String },

    #[error("'{0}' is not a date (YYYY-MM-DD)")]
    InvalidDate(String),
}

impl CollectionField {
    /// Turns raw user input into a value of this field's type.
    ///
    /// Blank input is [`CustomValue::Null`].
    pub fn coerce(&self, raw: &str) -> Result<CustomValue, FieldIssue> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(CustomValue::Null);
        }
        let value = match self.field_type {
            FieldType::Number => raw
                .replace(',', ".")
                .parse::<f64>()
                .map(CustomValue::Number)
                .map_err(|_| FieldIssue::NotANumber(raw.to_string()))?,
            _ => CustomValue::Text(raw.to_string()),
        };
        self.validate(&value)?;
        Ok(value)
    }

    /// Checks a stored value against this field's type.
    pub fn validate(&self, value: &CustomValue) -> Result<(), FieldIssue> {
        if value.is_empty() {
            return Ok(());
        }
        match (self.field_type, value) {
            (FieldType::Text | FieldType::Longtext, CustomValue::Text(_)) => Ok(()),
            (FieldType::Number, CustomValue::Number(_)) => Ok(()),
            (FieldType::Number, CustomValue::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map(|_| ())
                .map_err(|_| FieldIssue::NotANumber(s.clone())),
            (FieldType::Select, CustomValue::Text(s)) => {
                let options = self.options.as_deref().unwrap_or_default();
                if options.iter().any(|o| o == s) {
                    Ok(())
                } else {
                    Err(FieldIssue::NotAnOption {
                        value: s.clone(),
                        options: options.join(", "),
                    })
                }
            }
            (FieldType::Date, CustomValue::Text(s)) => NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map(|_| ())
                .map_err(|_| FieldIssue::InvalidDate(s.clone())),
            (expected, _) => Err(FieldIssue::TypeMismatch(expected)),
        }
    }

    /// Human-readable rendering of a value for this field.
    pub fn display(&self, value: &CustomValue) -> String {
        match (self.field_type, value) {
            (FieldType::Date, CustomValue::Text(s)) => NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map(|d| d.format("%-d %b %Y").to_string())
                .unwrap_or_else(|_| s.clone()),
            _ => value.to_string(),
        }
    }
}

impl Collection {
    /// Validates every known field present on the entry. Unknown keys are ignored.
    pub fn validate_entry(&self, entry: &Entry) -> Vec<(String, FieldIssue)> {
        self.fields
            .iter()
            .filter_map(|field| {
                field
                    .validate(entry.custom_value(&field.key))
                    .err()
                    .map(|issue| (field.key.clone(), issue))
            })
            .collect()
    }

    /// Label/value pairs for the non-empty fields of an entry, in schema order.
    pub fn rows(&self, entry: &Entry) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter_map(|field| {
                let value = entry.custom_value(&field.key);
                (!value.is_empty()).then(|| (field.label.clone(), field.display(value)))
            })
            .collect()
    }

    /// Short line under an entry title: the non-empty values of the subtitle
    /// keys, or the first two non-empty values when the collection names none.
    pub fn subtitle(&self, entry: &Entry) -> String {
        let values: Vec<String> = if self.subtitle_keys.is_empty() {
            self.rows(entry)
                .into_iter()
                .take(2)
                .map(|(_, value)| value)
                .collect()
        } else {
            self.subtitle_keys
                .iter()
                .filter_map(|key| {
                    let value = entry.custom_value(key);
                    if value.is_empty() {
                        return None;
                    }
                    Some(match self.field(key) {
                        Some(field) => field.display(value),
                        None => value.to_string(),
                    })
                })
                .collect()
        };
        values.join(SUBTITLE_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crystals() -> Collection {
        Collection {
            id: "crystals".into(),
            name: "Kristaller".into(),
            icon: None,
            fields: vec![
                CollectionField::new("hardness", "Hårdhet", FieldType::Number),
                CollectionField::new("color", "Färg", FieldType::Text),
                CollectionField::select("chakra", "Chakra", &["Rot", "Hjärta"]),
                CollectionField::new("found", "Hittad", FieldType::Date),
            ],
            subtitle_keys: vec![],
        }
    }

    #[test]
    fn custom_values_roundtrip_as_plain_json() {
        let json = r#"{"a":"x","b":7,"c":true,"d":null}"#;
        let map: std::collections::BTreeMap<String, CustomValue> =
            serde_json::from_str(json).unwrap();
        assert_eq!(map["a"], CustomValue::Text("x".into()));
        assert_eq!(map["b"], CustomValue::Number(7.0));
        assert_eq!(map["c"], CustomValue::Bool(true));
        assert_eq!(map["d"], CustomValue::Null);
    }

    #[test]
    fn coerce_number_accepts_decimal_comma() {
        let field = &crystals().fields[0];
        assert_eq!(field.coerce("6,5").unwrap(), CustomValue::Number(6.5));
        assert!(matches!(field.coerce("hard"), Err(FieldIssue::NotANumber(_))));
        assert_eq!(field.coerce("  ").unwrap(), CustomValue::Null);
    }

    #[test]
    fn select_rejects_unknown_option() {
        let field = &crystals().fields[2];
        assert!(field.coerce("Hjärta").is_ok());
        assert!(matches!(
            field.coerce("Krona"),
            Err(FieldIssue::NotAnOption { .. })
        ));
    }

    #[test]
    fn date_requires_iso_format() {
        let field = &crystals().fields[3];
        assert!(field.coerce("2024-03-01").is_ok());
        assert!(matches!(field.coerce("1/3/2024"), Err(FieldIssue::InvalidDate(_))));
        assert_eq!(field.display(&"2024-03-01".into()), "1 Mar 2024");
    }

    #[test]
    fn text_field_rejects_numbers() {
        let field = &crystals().fields[1];
        assert_eq!(
            field.validate(&CustomValue::Number(1.0)),
            Err(FieldIssue::TypeMismatch(FieldType::Text))
        );
    }

    #[test]
    fn validate_entry_ignores_unknown_and_missing_keys() {
        let mut entry = Entry::new("crystals".into(), "Kvarts".into(), String::new());
        entry.custom.insert("legacy".into(), CustomValue::Bool(true));
        entry.custom.insert("hardness".into(), CustomValue::Text("soft".into()));
        let issues = crystals().validate_entry(&entry);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].0, "hardness");
    }

    #[test]
    fn subtitle_joins_first_two_values_in_schema_order() {
        let mut entry = Entry::new("crystals".into(), "Kvarts".into(), String::new());
        entry.custom.insert("chakra".into(), "Hjärta".into());
        entry.custom.insert("hardness".into(), CustomValue::Number(7.0));
        entry.custom.insert("color".into(), CustomValue::Text("".into()));
        assert_eq!(crystals().subtitle(&entry), "7 • Hjärta");
    }

    fn seeded(id: &str) -> Collection {
        crate::store::defaults::default_collections()
            .into_iter()
            .find(|c| c.id == id)
            .unwrap()
    }

    #[test]
    fn crystal_subtitle_is_color_and_chakra() {
        let mut entry = Entry::new("crystals".into(), "Ametist".into(), String::new());
        entry.custom.insert("hardness".into(), CustomValue::Number(7.0));
        entry.custom.insert("color".into(), "Lila".into());
        entry.custom.insert("chakra".into(), "Hjärta".into());
        assert_eq!(seeded("crystals").subtitle(&entry), "Lila • Hjärta");

        entry.custom.remove("color");
        assert_eq!(seeded("crystals").subtitle(&entry), "Hjärta");
    }

    #[test]
    fn herb_subtitle_skips_parts() {
        let mut entry = Entry::new("herbs".into(), "Gråbo".into(), String::new());
        entry.custom.insert("parts".into(), "Blad".into());
        entry.custom.insert("latin".into(), "Artemisia vulgaris".into());
        entry.custom.insert("planet".into(), "Venus".into());
        assert_eq!(
            seeded("herbs").subtitle(&entry),
            "Artemisia vulgaris • Venus"
        );
    }

    #[test]
    fn single_key_subtitle() {
        let mut entry = Entry::new("rituals".into(), "Nymåne".into(), String::new());
        entry.custom.insert("purpose".into(), "Början".into());
        entry.custom.insert("steps".into(), "Tänd ljuset".into());
        assert_eq!(seeded("rituals").subtitle(&entry), "Början");
    }
}
