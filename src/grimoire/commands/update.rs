use crate::commands::{schema_warnings, CmdMessage, CmdResult, EntryPatch};
use crate::error::Result;
use crate::model::UNTITLED;
use crate::store::{GrimoireStore, KvBackend};
use tracing::{debug, info};

/// Merges `patch` into the entry with `id` and bumps `updated_at`.
///
/// An unknown id is a silent no-op.
pub fn run<B: KvBackend>(
    store: &GrimoireStore<B>,
    id: &str,
    patch: EntryPatch,
) -> Result<CmdResult> {
    let mut entries = store.get_entries()?;
    let Some(entry) = entries.iter_mut().find(|e| e.id == id) else {
        debug!(id, "update of missing entry ignored");
        return Ok(CmdResult::default());
    };
    // read before the write: nothing may fail once the entry is saved
    let collections = store.get_collections()?;

    if let Some(collection_id) = patch.collection_id {
        entry.collection_id = collection_id;
    }
    if let Some(title) = patch.title {
        entry.title = if title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            title
        };
    }
    if let Some(content_md) = patch.content_md {
        entry.content_md = content_md;
    }
    if let Some(tags) = patch.tags {
        entry.tags = tags;
    }
    if let Some(images) = patch.images {
        entry.images = images;
    }
    if let Some(related_ids) = patch.related_ids {
        entry.related_ids = related_ids;
    }
    if let Some(custom) = patch.custom {
        entry.custom = custom;
    }
    entry.touch();
    let updated = entry.clone();

    store.save_entries(&entries)?;
    info!(id, "entry updated");

    let mut result = CmdResult::default();
    for warning in schema_warnings(&updated, &collections) {
        result.add_message(warning);
    }
    result.add_message(CmdMessage::success(format!(
        "Entry updated: {}",
        updated.title
    )));
    Ok(result.with_affected_entries(vec![updated]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, NewEntry};
    use crate::store::mem_backend::MemBackend;

    fn store_with_entry() -> (GrimoireStore<MemBackend>, String) {
        let store = GrimoireStore::new(MemBackend::new());
        let created = create::run(
            &store,
            NewEntry::new("herbs", "Ginger")
                .content("warming")
                .tags(vec!["root".into()]),
        )
        .unwrap();
        let id = created.affected_entries[0].id.clone();
        (store, id)
    }

    #[test]
    fn title_update_bumps_updated_at() {
        let (store, id) = store_with_entry();
        let patch = EntryPatch {
            title: Some("Ingefära".into()),
            ..Default::default()
        };
        run(&store, &id, patch).unwrap();

        let entry = &store.get_entries().unwrap()[0];
        assert_eq!(entry.title, "Ingefära");
        assert!(entry.updated_at > entry.created_at);
    }

    #[test]
    fn absent_fields_are_kept() {
        let (store, id) = store_with_entry();
        let patch = EntryPatch {
            content_md: Some("spicy".into()),
            ..Default::default()
        };
        run(&store, &id, patch).unwrap();

        let entry = &store.get_entries().unwrap()[0];
        assert_eq!(entry.title, "Ginger");
        assert_eq!(entry.tags, vec!["root".to_string()]);
        assert_eq!(entry.content_md, "spicy");
    }

    #[test]
    fn created_at_never_changes() {
        let (store, id) = store_with_entry();
        let created_at = store.get_entries().unwrap()[0].created_at;
        run(&store, &id, EntryPatch::default()).unwrap();
        run(&store, &id, EntryPatch::default()).unwrap();
        let entry = &store.get_entries().unwrap()[0];
        assert_eq!(entry.created_at, created_at);
        assert!(entry.updated_at >= created_at + 2);
    }

    #[test]
    fn failed_seeding_leaves_entry_unchanged() {
        let store = GrimoireStore::new(MemBackend::new());
        let entry = crate::model::Entry::new("notes".into(), "a".into(), String::new());
        store.save_entries(&[entry.clone()]).unwrap();
        store.backend().set_simulate_write_error(true);

        let patch = EntryPatch {
            title: Some("b".into()),
            ..Default::default()
        };
        assert!(run(&store, &entry.id, patch).is_err());
        assert_eq!(store.get_entries().unwrap()[0].title, "a");
    }

    #[test]
    fn missing_id_is_silent_noop() {
        let (store, _) = store_with_entry();
        let before = store.get_entries().unwrap();
        let writes = store.backend().write_count();

        let result = run(
            &store,
            "nope",
            EntryPatch {
                title: Some("x".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(result.affected_entries.is_empty());
        assert!(result.messages.is_empty());
        assert_eq!(store.get_entries().unwrap(), before);
        assert_eq!(store.backend().write_count(), writes);
    }
}
