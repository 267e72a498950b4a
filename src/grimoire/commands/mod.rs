//! # Entry Lifecycle
//!
//! Business logic over the store, one module per operation. Every command takes
//! the store plus plain Rust arguments and returns a [`CmdResult`]; none of them
//! print or assume a terminal.
//!
//! Every write replaces a whole aggregate (see [`crate::store`]), so each
//! mutating command is a read-modify-write of the full entry list.

use crate::markup;
use crate::model::{collection_name, Collection, Entry, Language, Settings, Theme};
use crate::schema::CustomValue;
use std::collections::BTreeMap;

pub mod create;
pub mod delete;
pub mod get;
pub mod library;
pub mod list;
pub mod relations;
pub mod search;
pub mod settings;
pub mod update;

/// Snippet length of the home and library listings.
pub const DEFAULT_SNIPPET_LENGTH: usize = 160;
/// Snippet length of search results.
pub const SEARCH_SNIPPET_LENGTH: usize = 140;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

/// An entry prepared for a listing.
#[derive(Debug, Clone)]
pub struct EntryView {
    pub entry: Entry,
    /// Collection name, or "unknown" for a dangling reference.
    pub collection_name: String,
    pub subtitle: String,
    pub snippet: String,
}

impl EntryView {
    pub fn new(entry: Entry, collections: &[Collection], snippet_len: usize) -> Self {
        let collection = collections.iter().find(|c| c.id == entry.collection_id);
        let subtitle = collection.map(|c| c.subtitle(&entry)).unwrap_or_default();
        let snippet = markup::snippet(&entry.content_md, Some(&entry.title), snippet_len);
        Self {
            collection_name: collection_name(collections, &entry.collection_id).to_string(),
            subtitle,
            snippet,
            entry,
        }
    }
}

/// One collection in the library overview.
#[derive(Debug, Clone)]
pub struct CollectionSummary {
    pub collection: Collection,
    pub count: usize,
    pub recent_titles: Vec<String>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_entries: Vec<Entry>,
    pub listed_entries: Vec<EntryView>,
    pub collections: Vec<CollectionSummary>,
    pub settings: Option<Settings>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_entries(mut self, entries: Vec<Entry>) -> Self {
        self.affected_entries = entries;
        self
    }

    pub fn with_listed_entries(mut self, entries: Vec<EntryView>) -> Self {
        self.listed_entries = entries;
        self
    }

    pub fn with_collections(mut self, collections: Vec<CollectionSummary>) -> Self {
        self.collections = collections;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }
}

/// Input for [`create::run`].
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub collection_id: String,
    pub title: String,
    pub content_md: String,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub related_ids: Vec<String>,
    pub custom: BTreeMap<String, CustomValue>,
}

impl NewEntry {
    pub fn new(collection_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn content(mut self, content_md: impl Into<String>) -> Self {
        self.content_md = content_md.into();
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Fields to replace on an existing entry. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub collection_id: Option<String>,
    pub title: Option<String>,
    pub content_md: Option<String>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub related_ids: Option<Vec<String>>,
    pub custom: Option<BTreeMap<String, CustomValue>>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.collection_id.is_none()
            && self.title.is_none()
            && self.content_md.is_none()
            && self.tags.is_none()
            && self.images.is_none()
            && self.related_ids.is_none()
            && self.custom.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub text: String,
    pub collection_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsChange {
    pub theme: Option<Theme>,
    pub language: Option<Language>,
}

/// Most recently updated first.
pub(crate) fn sort_recent(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// Warnings for custom values that do not fit the entry's collection schema.
pub(crate) fn schema_warnings(entry: &Entry, collections: &[Collection]) -> Vec<CmdMessage> {
    let Some(collection) = collections.iter().find(|c| c.id == entry.collection_id) else {
        return vec![CmdMessage::warning(format!(
            "Collection '{}' does not exist",
            entry.collection_id
        ))];
    };
    collection
        .validate_entry(entry)
        .into_iter()
        .map(|(key, issue)| CmdMessage::warning(format!("{}: {}", key, issue)))
        .collect()
}
