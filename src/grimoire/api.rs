//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the store. It is
//! the single entry point for UIs: the CLI in this crate, or any other host that
//! embeds the library.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Applies configuration** (snippet length, default listing size)
//! - **Returns structured types** (`Result<CmdResult>` or plain aggregates)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **I/O beyond the store**: no stdout, stderr or file formatting
//! - **Presentation**: returns data structures, not strings
//!
//! ## Generic Over KvBackend
//!
//! `GrimoireApi<B: KvBackend>` is generic over the storage backend:
//! - Production: `GrimoireApi<FsBackend>`
//! - Testing: `GrimoireApi<MemBackend>`

use crate::commands::{
    self, CmdResult, EntryPatch, NewEntry, SearchQuery, SettingsChange, SEARCH_SNIPPET_LENGTH,
};
use crate::config::GrimoireConfig;
use crate::editor::EditingSession;
use crate::error::Result;
use crate::markup;
use crate::model::{Collection, Entry, Settings};
use crate::store::{ExportBundle, GrimoireStore, KvBackend};
use serde_json::Value;

pub struct GrimoireApi<B: KvBackend> {
    store: GrimoireStore<B>,
    config: GrimoireConfig,
}

impl<B: KvBackend> GrimoireApi<B> {
    pub fn new(backend: B, config: GrimoireConfig) -> Self {
        Self {
            store: GrimoireStore::new(backend),
            config,
        }
    }

    pub fn store(&self) -> &GrimoireStore<B> {
        &self.store
    }

    pub fn config(&self) -> &GrimoireConfig {
        &self.config
    }

    // --- aggregates ---

    pub fn collections(&self) -> Result<Vec<Collection>> {
        self.store.get_collections()
    }

    pub fn save_collections(&self, collections: &[Collection]) -> Result<()> {
        self.store.save_collections(collections)
    }

    pub fn entries(&self) -> Result<Vec<Entry>> {
        self.store.get_entries()
    }

    pub fn save_entries(&self, entries: &[Entry]) -> Result<()> {
        self.store.save_entries(entries)
    }

    pub fn settings(&self) -> Result<Settings> {
        self.store.get_settings()
    }

    pub fn export(&self) -> Result<ExportBundle> {
        self.store.export_all()
    }

    pub fn import(&self, payload: &Value) -> Result<()> {
        self.store.import_all(payload)
    }

    pub fn import_json(&self, text: &str) -> Result<()> {
        self.store.import_json(text)
    }

    // --- lifecycle ---

    pub fn create_entry(&self, new: NewEntry) -> Result<CmdResult> {
        commands::create::run(&self.store, new)
    }

    pub fn update_entry(&self, id: &str, patch: EntryPatch) -> Result<CmdResult> {
        commands::update::run(&self.store, id, patch)
    }

    pub fn delete_entry(&self, id: &str) -> Result<CmdResult> {
        commands::delete::run(&self.store, id)
    }

    pub fn get_entry(&self, id: &str) -> Result<CmdResult> {
        commands::get::run(&self.store, id)
    }

    pub fn toggle_relation(&self, id: &str, other_id: &str) -> Result<CmdResult> {
        commands::relations::run(&self.store, id, other_id)
    }

    pub fn search(&self, query: &SearchQuery) -> Result<CmdResult> {
        commands::search::run(&self.store, query, SEARCH_SNIPPET_LENGTH)
    }

    /// Most recent entries; `limit` falls back to the configured listing size.
    pub fn recent(&self, collection_id: Option<&str>, limit: Option<usize>) -> Result<CmdResult> {
        commands::list::recent(
            &self.store,
            collection_id,
            limit.unwrap_or(self.config.recent_limit),
            self.config.snippet_length,
        )
    }

    pub fn library(&self) -> Result<CmdResult> {
        commands::library::run(&self.store)
    }

    pub fn change_settings(&self, change: SettingsChange) -> Result<CmdResult> {
        commands::settings::run(&self.store, change)
    }

    // --- content ---

    pub fn render_html(&self, content: &str) -> String {
        markup::render_to_html(content)
    }

    pub fn plain_text(&self, content: &str, title: Option<&str>) -> String {
        markup::to_plain_text(content, title)
    }

    /// Starts an editing session on the stored content of `id`.
    pub fn edit_session(&self, id: &str) -> Result<EditingSession> {
        let result = self.get_entry(id)?;
        let content = result
            .listed_entries
            .first()
            .map(|view| view.entry.content_md.clone())
            .unwrap_or_default();
        Ok(EditingSession::new(content))
    }
}
