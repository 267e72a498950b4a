use crate::commands::{CmdResult, EntryView, DEFAULT_SNIPPET_LENGTH};
use crate::error::{GrimoireError, Result};
use crate::store::{GrimoireStore, KvBackend};

pub fn run<B: KvBackend>(store: &GrimoireStore<B>, id: &str) -> Result<CmdResult> {
    let entry = store
        .get_entries()?
        .into_iter()
        .find(|e| e.id == id)
        .ok_or_else(|| GrimoireError::NotFound(id.to_string()))?;
    let collections = store.get_collections()?;
    let view = EntryView::new(entry, &collections, DEFAULT_SNIPPET_LENGTH);
    Ok(CmdResult::default().with_listed_entries(vec![view]))
}
