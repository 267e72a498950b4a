//! Core data types: [`Collection`], [`Entry`] and [`Settings`].
//!
//! Field names serialize in the interchange format of the export file
//! (`collectionId`, `contentMD`, `relatedIds`, ...), so a stored aggregate and an
//! exported one are byte-compatible.

use crate::schema::CustomValue;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Title given to entries saved without one.
pub const UNTITLED: &str = "(utan titel)";

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

pub fn now_millis() -> Millis {
    Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Longtext,
    Number,
    Select,
    Date,
}

/// One field of a collection schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionField {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Allowed values, present iff `field_type` is [`FieldType::Select`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl CollectionField {
    pub fn new(key: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            field_type,
            options: None,
        }
    }

    pub fn select(key: &str, label: &str, options: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            field_type: FieldType::Select,
            options: Some(options.iter().map(|o| o.to_string()).collect()),
        }
    }
}

/// A category of entries with its own custom-field schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub fields: Vec<CollectionField>,
    /// Keys whose values make up the line under an entry title.
    #[serde(
        default,
        rename = "subtitleKeys",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub subtitle_keys: Vec<String>,
}

impl Collection {
    pub fn field(&self, key: &str) -> Option<&CollectionField> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// Name shown for an entry whose collection no longer exists.
pub const UNKNOWN_COLLECTION: &str = "unknown";

/// Resolves a collection by id, tolerating dangling references.
pub fn collection_name<'a>(collections: &'a [Collection], id: &str) -> &'a str {
    collections
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.as_str())
        .unwrap_or(UNKNOWN_COLLECTION)
}

/// One note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub collection_id: String,
    pub title: String,
    /// Markdown source of record. HTML is always derived from it.
    #[serde(rename = "contentMD", default)]
    pub content_md: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Inline image payloads (data URIs), owned by the entry.
    #[serde(default)]
    pub images: Vec<String>,
    /// Weak references to other entries; may dangle.
    #[serde(default)]
    pub related_ids: Vec<String>,
    #[serde(default)]
    pub custom: BTreeMap<String, CustomValue>,
    pub created_at: Millis,
    pub updated_at: Millis,
}

impl Entry {
    pub fn new(collection_id: String, title: String, content_md: String) -> Self {
        let now = now_millis();
        let title = if title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            title
        };
        Self {
            id: Uuid::new_v4().to_string(),
            collection_id,
            title,
            content_md,
            tags: Vec::new(),
            images: Vec::new(),
            related_ids: Vec::new(),
            custom: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Bumps `updated_at`, keeping it strictly increasing and never below `created_at`.
    pub fn touch(&mut self) {
        let floor = self.updated_at.max(self.created_at) + 1;
        self.updated_at = now_millis().max(floor);
    }

    /// Custom value for `key`; absent keys read as [`CustomValue::Null`].
    pub fn custom_value(&self, key: &str) -> &CustomValue {
        self.custom.get(key).unwrap_or(&CustomValue::Null)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Parchment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Sv,
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub theme: Theme,
    pub language: Language,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Parchment => "parchment",
        };
        f.write_str(s)
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            "parchment" => Ok(Theme::Parchment),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Language::Sv => "sv",
            Language::En => "en",
        })
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sv" => Ok(Language::Sv),
            "en" => Ok(Language::En),
            other => Err(format!("unknown language: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_has_equal_timestamps_and_placeholder_title() {
        let entry = Entry::new("notes".into(), "   ".into(), String::new());
        assert_eq!(entry.created_at, entry.updated_at);
        assert_eq!(entry.title, UNTITLED);
        assert!(Uuid::parse_str(&entry.id).is_ok());
    }

    #[test]
    fn touch_is_strictly_increasing() {
        let mut entry = Entry::new("notes".into(), "T".into(), String::new());
        let before = entry.updated_at;
        entry.touch();
        assert!(entry.updated_at > before);
        let second = entry.updated_at;
        entry.touch();
        assert!(entry.updated_at > second);
    }

    #[test]
    fn entry_serializes_with_interchange_names() {
        let entry = Entry::new("herbs".into(), "Ginger".into(), "# Ginger".into());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["collectionId"], "herbs");
        assert_eq!(json["contentMD"], "# Ginger");
        assert!(json["relatedIds"].is_array());
        assert!(json["createdAt"].is_i64());
    }

    #[test]
    fn entry_tolerates_missing_collections_fields() {
        let json = r#"{"id":"x","collectionId":"c","title":"t","contentMD":"",
            "createdAt":1,"updatedAt":2}"#;
        let entry: Entry = serde_json::from_str(json).unwrap();
        assert!(entry.tags.is_empty());
        assert!(entry.custom.is_empty());
        assert_eq!(entry.custom_value("rank"), &CustomValue::Null);
    }

    #[test]
    fn settings_default_is_dark_swedish() {
        let settings = Settings::default();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.language, Language::Sv);
        assert_eq!(
            serde_json::to_string(&settings).unwrap(),
            r#"{"theme":"dark","language":"sv"}"#
        );
    }

    #[test]
    fn dangling_collection_reads_as_unknown() {
        let cols = vec![Collection {
            id: "notes".into(),
            name: "Anteckningar".into(),
            icon: None,
            fields: vec![],
            subtitle_keys: vec![],
        }];
        assert_eq!(collection_name(&cols, "notes"), "Anteckningar");
        assert_eq!(collection_name(&cols, "gone"), UNKNOWN_COLLECTION);
    }

    #[test]
    fn theme_parses_case_insensitively() {
        assert_eq!("Parchment".parse::<Theme>().unwrap(), Theme::Parchment);
        assert!("neon".parse::<Theme>().is_err());
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
    }
}
