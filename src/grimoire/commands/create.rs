use crate::commands::{schema_warnings, CmdMessage, CmdResult, NewEntry};
use crate::error::Result;
use crate::model::Entry;
use crate::store::{GrimoireStore, KvBackend};
use tracing::info;

pub fn run<B: KvBackend>(store: &GrimoireStore<B>, new: NewEntry) -> Result<CmdResult> {
    let mut entry = Entry::new(new.collection_id, new.title, new.content_md);
    entry.tags = new.tags;
    entry.images = new.images;
    entry.related_ids = new.related_ids;
    entry.custom = new.custom;

    // read before the write: nothing may fail once the entry is saved
    let collections = store.get_collections()?;
    let mut entries = store.get_entries()?;
    entries.push(entry.clone());
    store.save_entries(&entries)?;
    info!(id = %entry.id, collection = %entry.collection_id, "entry created");

    let mut result = CmdResult::default();
    for warning in schema_warnings(&entry, &collections) {
        result.add_message(warning);
    }
    result.add_message(CmdMessage::success(format!(
        "Entry created: {}",
        entry.title
    )));
    Ok(result.with_affected_entries(vec![entry]))
}
