//! # CLI Layer
//!
//! This module is **one possible UI client** for grimoire. It is the only place
//! that knows about terminal I/O, process exit codes and argument parsing.
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: shell arguments into typed commands via clap
//! 2. **Context Setup**: data directory, configuration, logging, `AppContext`
//! 3. **Input Normalization**: collection names to ids, id prefixes to ids,
//!    `key=value` options to typed custom values
//! 4. **API Dispatch**: one `GrimoireApi` call per command
//! 5. **Output Formatting**: `CmdResult` into colored terminal output
//!
//! Business logic stays in `grimoire::commands`.

use super::print::{
    print_entries, print_entry, print_library, print_messages, print_settings,
};
use super::setup::{Cli, Commands};
use clap::Parser;
use directories::ProjectDirs;
use grimoire::api::GrimoireApi;
use grimoire::commands::{EntryPatch, NewEntry, SearchQuery, SettingsChange};
use grimoire::config::GrimoireConfig;
use grimoire::error::{GrimoireError, Result};
use grimoire::model::{Collection, Entry, Language, Theme};
use grimoire::schema::CustomValue;
use grimoire::store::fs_backend::FsBackend;
use grimoire::tags::parse_tag_list;
use std::collections::BTreeMap;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Overrides the platform data directory when `--data-dir` is not given.
const DATA_DIR_ENV: &str = "GRIMOIRE_DATA_DIR";

struct AppContext {
    api: GrimoireApi<FsBackend>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Collections) => handle_collections(&ctx),
        Some(Commands::List { collection, limit }) => handle_list(&ctx, collection, limit),
        Some(Commands::Search { text, collection }) => handle_search(&ctx, text, collection),
        Some(Commands::Show { id, html }) => handle_show(&ctx, &id, html),
        Some(Commands::Create {
            collection,
            title,
            tags,
            fields,
            content,
        }) => handle_create(&ctx, collection, title, tags, fields, content),
        Some(Commands::Edit {
            id,
            title,
            content,
            tags,
            fields,
        }) => handle_edit(&ctx, &id, title, content, tags, fields),
        Some(Commands::Delete { id }) => handle_delete(&ctx, &id),
        Some(Commands::Relate { id, other }) => handle_relate(&ctx, &id, &other),
        Some(Commands::Export { file }) => handle_export(&ctx, file),
        Some(Commands::Import { file }) => handle_import(&ctx, &file),
        Some(Commands::Settings { theme, language }) => handle_settings(&ctx, theme, language),
        None => handle_list(&ctx, None, None),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = resolve_data_dir(cli.data_dir.clone())?;
    let config = GrimoireConfig::load(&data_dir)?;
    debug!(data_dir = %data_dir.display(), database = %config.database, "opening store");

    let backend = FsBackend::new(&data_dir, &config.database);
    Ok(AppContext {
        api: GrimoireApi::new(backend, config),
    })
}

fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "grimoire", "grimoire")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| GrimoireError::Api("Could not determine data directory".into()))
}

fn handle_collections(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.library()?;
    print_library(&result.collections);
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &AppContext, collection: Option<String>, limit: Option<usize>) -> Result<()> {
    let collection_id = match collection {
        Some(c) => Some(resolve_collection(ctx, &c)?.id),
        None => None,
    };
    let result = ctx.api.recent(collection_id.as_deref(), limit)?;
    print_entries(&result.listed_entries);
    print_messages(&result.messages);
    Ok(())
}

fn handle_search(ctx: &AppContext, text: Vec<String>, collection: Option<String>) -> Result<()> {
    let collection_id = match collection {
        Some(c) => Some(resolve_collection(ctx, &c)?.id),
        None => None,
    };
    let query = SearchQuery {
        text: text.join(" "),
        collection_id,
    };
    let result = ctx.api.search(&query)?;
    print_entries(&result.listed_entries);
    print_messages(&result.messages);
    Ok(())
}

fn handle_show(ctx: &AppContext, id: &str, html: bool) -> Result<()> {
    let id = resolve_entry_id(ctx, id)?;
    let result = ctx.api.get_entry(&id)?;
    let Some(view) = result.listed_entries.first() else {
        return Err(GrimoireError::NotFound(id));
    };

    let collections = ctx.api.collections()?;
    let rows = collections
        .iter()
        .find(|c| c.id == view.entry.collection_id)
        .map(|c| c.rows(&view.entry))
        .unwrap_or_default();

    let entries = ctx.api.entries()?;
    let related_titles: Vec<String> = view
        .entry
        .related_ids
        .iter()
        .filter_map(|rid| entries.iter().find(|e| &e.id == rid))
        .map(|e| e.title.clone())
        .collect();

    let body = if html {
        ctx.api.render_html(&view.entry.content_md)
    } else {
        view.entry.content_md.clone()
    };
    print_entry(view, &rows, &related_titles, &body);
    Ok(())
}

fn handle_create(
    ctx: &AppContext,
    collection: String,
    title: String,
    tags: Vec<String>,
    fields: Vec<String>,
    content: Option<String>,
) -> Result<()> {
    let collection = resolve_collection(ctx, &collection)?;
    let custom = parse_fields(&collection, &fields, BTreeMap::new())?;

    let content = match content {
        Some(c) => c,
        None => read_piped_stdin()?,
    };

    let mut new = NewEntry::new(collection.id, title)
        .content(content)
        .tags(tags.iter().flat_map(|t| parse_tag_list(t)).collect());
    new.custom = custom;

    let result = ctx.api.create_entry(new)?;
    print_messages(&result.messages);
    if let Some(entry) = result.affected_entries.first() {
        println!("{}", entry.id);
    }
    Ok(())
}

fn handle_edit(
    ctx: &AppContext,
    id: &str,
    title: Option<String>,
    content: Option<String>,
    tags: Option<String>,
    fields: Vec<String>,
) -> Result<()> {
    let id = resolve_entry_id(ctx, id)?;
    let entry = find_entry(ctx, &id)?;

    let custom = if fields.is_empty() {
        None
    } else {
        let collection = ctx
            .api
            .collections()?
            .into_iter()
            .find(|c| c.id == entry.collection_id);
        let custom = match collection {
            Some(c) => parse_fields(&c, &fields, entry.custom.clone())?,
            None => parse_untyped_fields(&fields, entry.custom.clone())?,
        };
        Some(custom)
    };

    let patch = EntryPatch {
        title,
        content_md: content,
        tags: tags.as_deref().map(parse_tag_list),
        custom,
        ..Default::default()
    };
    if patch.is_empty() {
        println!("Nothing to change.");
        return Ok(());
    }

    let result = ctx.api.update_entry(&id, patch)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &AppContext, id: &str) -> Result<()> {
    let id = resolve_entry_id(ctx, id)?;
    let result = ctx.api.delete_entry(&id)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_relate(ctx: &AppContext, id: &str, other: &str) -> Result<()> {
    let id = resolve_entry_id(ctx, id)?;
    let other = resolve_entry_id(ctx, other)?;
    let result = ctx.api.toggle_relation(&id, &other)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(ctx: &AppContext, file: Option<PathBuf>) -> Result<()> {
    let bundle = ctx.api.export()?;
    let json = serde_json::to_string_pretty(&bundle)?;
    match file {
        Some(path) => {
            std::fs::write(&path, json)?;
            print_messages(&[grimoire::commands::CmdMessage::success(format!(
                "Exported {} entries to {}",
                bundle.entries.len(),
                path.display()
            ))]);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn handle_import(ctx: &AppContext, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)?;
    ctx.api.import_json(&text)?;
    print_messages(&[grimoire::commands::CmdMessage::success(format!(
        "Imported {}",
        file.display()
    ))]);
    Ok(())
}

fn handle_settings(
    ctx: &AppContext,
    theme: Option<Theme>,
    language: Option<Language>,
) -> Result<()> {
    if theme.is_none() && language.is_none() {
        print_settings(&ctx.api.settings()?);
        return Ok(());
    }
    let result = ctx.api.change_settings(SettingsChange { theme, language })?;
    if let Some(settings) = &result.settings {
        print_settings(settings);
    }
    print_messages(&result.messages);
    Ok(())
}

/// Accepts a collection id or its name, case-insensitively.
fn resolve_collection(ctx: &AppContext, input: &str) -> Result<Collection> {
    let wanted = input.trim().to_lowercase();
    ctx.api
        .collections()?
        .into_iter()
        .find(|c| c.id.to_lowercase() == wanted || c.name.to_lowercase() == wanted)
        .ok_or_else(|| GrimoireError::Api(format!("Unknown collection: {}", input)))
}

/// Expands a unique id prefix (as printed by `list`) to the full id.
///
/// Input that matches nothing is passed through unchanged, so commands that
/// tolerate missing ids keep doing so.
fn resolve_entry_id(ctx: &AppContext, input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(GrimoireError::Api("Entry id must not be empty".to_string()));
    }
    let entries = ctx.api.entries()?;
    if entries.iter().any(|e| e.id == input) {
        return Ok(input.to_string());
    }
    let matches: Vec<&Entry> = entries.iter().filter(|e| e.id.starts_with(input)).collect();
    match matches.as_slice() {
        [] => Ok(input.to_string()),
        [one] => Ok(one.id.clone()),
        _ => Err(GrimoireError::Api(format!(
            "Ambiguous id prefix '{}' matches {} entries",
            input,
            matches.len()
        ))),
    }
}

fn find_entry(ctx: &AppContext, id: &str) -> Result<Entry> {
    ctx.api
        .get_entry(id)?
        .listed_entries
        .into_iter()
        .next()
        .map(|view| view.entry)
        .ok_or_else(|| GrimoireError::NotFound(id.to_string()))
}

fn split_field(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim(), value))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| GrimoireError::Api(format!("Expected key=value, got '{}'", raw)))
}

/// Coerces `key=value` options through the collection schema into `custom`.
///
/// Keys the schema does not know are stored as text. An empty value removes
/// the key.
fn parse_fields(
    collection: &Collection,
    fields: &[String],
    mut custom: BTreeMap<String, CustomValue>,
) -> Result<BTreeMap<String, CustomValue>> {
    for raw in fields {
        let (key, value) = split_field(raw)?;
        let parsed = match collection.field(key) {
            Some(field) => field
                .coerce(value)
                .map_err(|issue| GrimoireError::Api(format!("{}: {}", key, issue)))?,
            None => text_value(value),
        };
        set_custom(&mut custom, key, parsed);
    }
    Ok(custom)
}

fn parse_untyped_fields(
    fields: &[String],
    mut custom: BTreeMap<String, CustomValue>,
) -> Result<BTreeMap<String, CustomValue>> {
    for raw in fields {
        let (key, value) = split_field(raw)?;
        set_custom(&mut custom, key, text_value(value));
    }
    Ok(custom)
}

fn text_value(value: &str) -> CustomValue {
    let value = value.trim();
    if value.is_empty() {
        CustomValue::Null
    } else {
        CustomValue::Text(value.to_string())
    }
}

fn set_custom(custom: &mut BTreeMap<String, CustomValue>, key: &str, value: CustomValue) {
    if value.is_empty() {
        custom.remove(key);
    } else {
        custom.insert(key.to_string(), value);
    }
}

fn read_piped_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut buffer = String::new();
    stdin.read_to_string(&mut buffer)?;
    Ok(buffer)
}
