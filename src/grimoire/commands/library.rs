use crate::commands::{sort_recent, CmdResult, CollectionSummary};
use crate::error::Result;
use crate::store::{GrimoireStore, KvBackend};

/// Titles shown under each collection in the overview.
const RECENT_TITLES: usize = 2;

/// Every collection in stored order with its entry count and latest titles.
pub fn run<B: KvBackend>(store: &GrimoireStore<B>) -> Result<CmdResult> {
    let collections = store.get_collections()?;
    let mut entries = store.get_entries()?;
    sort_recent(&mut entries);

    let summaries = collections
        .into_iter()
        .map(|collection| {
            let members: Vec<_> = entries
                .iter()
                .filter(|e| e.collection_id == collection.id)
                .collect();
            CollectionSummary {
                count: members.len(),
                recent_titles: members
                    .iter()
                    .take(RECENT_TITLES)
                    .map(|e| e.title.clone())
                    .collect(),
                collection,
            }
        })
        .collect();
    Ok(CmdResult::default().with_collections(summaries))
}
