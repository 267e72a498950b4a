//! # Grimoire Architecture
//!
//! Grimoire is an offline-first personal knowledge base: notes ("entries") filed
//! into typed collections (crystals, herbs, plain notes, ...), each with a
//! Markdown body, tags, inline images, relations and collection-specific custom
//! fields. It is a library first; the `grimoire` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands and the store                  │
//! │  - Applies configuration (snippet length, listing size)     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Entry lifecycle: create, update, delete, search, ...     │
//! │  - Operates on Rust types, returns CmdResult                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Three whole-value aggregates over a KvBackend            │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Beside the layers sit the content engines: [`markup`] converts between
//! Markdown, sanitized HTML and plain text, and [`editor`] keeps a Markdown
//! source and a visual rich-text document in sync.
//!
//! ## Markdown is the source of record
//!
//! Entries persist only Markdown. HTML is derived on demand and the visual
//! editing document is a projection rebuilt whenever the visual mode is
//! entered. Anything a host wants to keep has to survive
//! `html_to_markdown(render_to_html(md))`.
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never assumes a
//! terminal. Diagnostics go through `tracing`; the binary decides where they end
//! up.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Entry lifecycle, one module per operation
//! - [`store`]: Aggregates, export/import and the key-value backends
//! - [`model`]: Collections, entries, settings
//! - [`schema`]: Custom field values and their validation
//! - [`markup`]: Markdown/HTML conversion, sanitizing, snippets
//! - [`editor`]: Dual-mode editing session and the document surface
//! - [`theme`]: Observable theme service
//! - [`tags`]: Tag list parsing
//! - [`config`]: Configuration management
//! - [`error`]: Error types
//! - `cli`: Argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod markup;
pub mod model;
pub mod schema;
pub mod store;
pub mod tags;
pub mod theme;

#[cfg(test)]
pub(crate) mod test_utils;
