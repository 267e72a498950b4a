use crate::commands::{sort_recent, CmdResult, EntryView, SearchQuery};
use crate::error::Result;
use crate::model::Entry;
use crate::store::{GrimoireStore, KvBackend};

/// Case-insensitive substring search over title, content and tags.
///
/// An empty text matches everything (within the collection filter). Results
/// are newest first; there is no relevance ranking.
pub fn run<B: KvBackend>(
    store: &GrimoireStore<B>,
    query: &SearchQuery,
    snippet_len: usize,
) -> Result<CmdResult> {
    let needle = query.text.trim().to_lowercase();
    let mut matches: Vec<Entry> = store
        .get_entries()?
        .into_iter()
        .filter(|e| match &query.collection_id {
            Some(id) => &e.collection_id == id,
            None => true,
        })
        .filter(|e| needle.is_empty() || haystack(e).contains(&needle))
        .collect();
    sort_recent(&mut matches);

    let collections = store.get_collections()?;
    let listed = matches
        .into_iter()
        .map(|e| EntryView::new(e, &collections, snippet_len))
        .collect();
    Ok(CmdResult::default().with_listed_entries(listed))
}

fn haystack(entry: &Entry) -> String {
    format!(
        "{} {} {}",
        entry.title,
        entry.content_md,
        entry.tags.join(" ")
    )
    .to_lowercase()
}
