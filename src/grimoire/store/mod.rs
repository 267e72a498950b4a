//! # Storage Layer
//!
//! The grimoire persists three aggregates, each as one whole value under a fixed
//! key of a key-value substrate ([`KvBackend`]):
//!
//! | Key | Value | When absent |
//! |-----|-------|-------------|
//! | `collections` | `Vec<Collection>` | seeded with [`defaults::default_collections`] and persisted |
//! | `entries` | `Vec<Entry>` | empty list, nothing persisted |
//! | `settings` | `Settings` | `{theme: dark, language: sv}`, nothing persisted |
//!
//! A fourth, composite aggregate is the export envelope ([`ExportBundle`]) which
//! snapshots the other three plus a format version.
//!
//! ## No Transactions
//!
//! Every key is read and written independently. Writes replace the whole
//! aggregate, so two interleaved read-modify-write sequences on the same key
//! lose the earlier update, and an interrupted [`GrimoireStore::import_all`] can
//! leave some keys imported and others not. Both are accepted for a single-user,
//! single-process tool.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: one JSON file per key, written atomically.
//! - [`mem_backend::MemBackend`]: in-memory, for tests.

use crate::error::{GrimoireError, Result};
use crate::model::{Collection, Entry, Settings};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

pub mod backend;
pub mod defaults;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::KvBackend;

pub const COLLECTIONS_KEY: &str = "collections";
pub const ENTRIES_KEY: &str = "entries";
pub const SETTINGS_KEY: &str = "settings";

/// Version tag written into every export.
pub const FORMAT_VERSION: u32 = 2;

/// The export/import envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub collections: Vec<Collection>,
    pub entries: Vec<Entry>,
    pub settings: Settings,
    pub version: u32,
}

/// Repository of the grimoire aggregates over a key-value backend.
pub struct GrimoireStore<B: KvBackend> {
    backend: B,
}

impl<B: KvBackend> GrimoireStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.backend.set(key, &value)
    }

    /// Stored collections; the first ever call seeds and persists the defaults.
    pub fn get_collections(&self) -> Result<Vec<Collection>> {
        if let Some(collections) = self.load(COLLECTIONS_KEY)? {
            return Ok(collections);
        }
        let seeded = defaults::default_collections();
        debug!(count = seeded.len(), "seeding default collections");
        self.save_collections(&seeded)?;
        Ok(seeded)
    }

    pub fn save_collections(&self, collections: &[Collection]) -> Result<()> {
        debug!(count = collections.len(), "saving collections");
        self.store(COLLECTIONS_KEY, &collections)
    }

    pub fn get_entries(&self) -> Result<Vec<Entry>> {
        Ok(self.load(ENTRIES_KEY)?.unwrap_or_default())
    }

    pub fn save_entries(&self, entries: &[Entry]) -> Result<()> {
        debug!(count = entries.len(), "saving entries");
        self.store(ENTRIES_KEY, &entries)
    }

    pub fn get_settings(&self) -> Result<Settings> {
        Ok(self.load(SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        debug!(theme = %settings.theme, language = %settings.language, "saving settings");
        self.store(SETTINGS_KEY, settings)
    }

    /// Snapshot of every aggregate plus the format version.
    pub fn export_all(&self) -> Result<ExportBundle> {
        Ok(ExportBundle {
            collections: self.get_collections()?,
            entries: self.get_entries()?,
            settings: self.get_settings()?,
            version: FORMAT_VERSION,
        })
    }

    /// Overwrites every aggregate present in `payload`.
    ///
    /// A falsy payload (`null`, `false`, `0`, `""`) is a no-op. Anything else that
    /// is not a JSON object is [`GrimoireError::MalformedImport`]. Missing or null
    /// keys leave the stored aggregate untouched and unknown keys are ignored.
    /// All present aggregates are decoded before the first write, so a
    /// shape error never leaves a partial import behind.
    pub fn import_all(&self, payload: &Value) -> Result<()> {
        if is_falsy(payload) {
            debug!("empty import payload, nothing to do");
            return Ok(());
        }
        let object = payload.as_object().ok_or_else(|| {
            GrimoireError::MalformedImport(format!(
                "expected a JSON object, found {}",
                json_kind(payload)
            ))
        })?;

        if let Some(version) = object.get("version").and_then(Value::as_u64) {
            if version > u64::from(FORMAT_VERSION) {
                warn!(version, "importing a newer export format");
            }
        }

        let collections: Option<Vec<Collection>> = decode_field(object, COLLECTIONS_KEY)?;
        let entries: Option<Vec<Entry>> = decode_field(object, ENTRIES_KEY)?;
        let settings: Option<Settings> = decode_field(object, SETTINGS_KEY)?;

        if let Some(collections) = collections {
            self.save_collections(&collections)?;
        }
        if let Some(entries) = entries {
            self.save_entries(&entries)?;
        }
        if let Some(settings) = settings {
            self.save_settings(&settings)?;
        }
        Ok(())
    }

    /// Parses an export file and imports it.
    pub fn import_json(&self, text: &str) -> Result<()> {
        let payload: Value = serde_json::from_str(text)
            .map_err(|e| GrimoireError::MalformedImport(e.to_string()))?;
        self.import_all(&payload)
    }
}

fn decode_field<T: DeserializeOwned>(
    object: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Option<T>> {
    match object.get(key) {
        None => Ok(None),
        Some(value) if is_falsy(value) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| GrimoireError::MalformedImport(format!("{}: {}", key, e))),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
