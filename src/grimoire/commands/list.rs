use crate::commands::{sort_recent, CmdResult, EntryView};
use crate::error::Result;
use crate::store::{GrimoireStore, KvBackend};

/// The `limit` most recently updated entries, optionally within one collection.
pub fn recent<B: KvBackend>(
    store: &GrimoireStore<B>,
    collection_id: Option<&str>,
    limit: usize,
    snippet_len: usize,
) -> Result<CmdResult> {
    let mut entries = store.get_entries()?;
    if let Some(id) = collection_id {
        entries.retain(|e| e.collection_id == id);
    }
    sort_recent(&mut entries);
    entries.truncate(limit);

    let collections = store.get_collections()?;
    let listed = entries
        .into_iter()
        .map(|e| EntryView::new(e, &collections, snippet_len))
        .collect();
    Ok(CmdResult::default().with_listed_entries(listed))
}
