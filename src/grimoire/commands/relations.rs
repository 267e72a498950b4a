use crate::commands::{update, CmdMessage, CmdResult, EntryPatch};
use crate::error::{GrimoireError, Result};
use crate::store::{GrimoireStore, KvBackend};

/// Adds `other_id` if absent, removes every occurrence if present.
///
/// Existence of `other_id` is not checked; relations are weak references.
pub fn toggle(related_ids: &[String], other_id: &str) -> Vec<String> {
    if related_ids.iter().any(|id| id == other_id) {
        related_ids
            .iter()
            .filter(|id| *id != other_id)
            .cloned()
            .collect()
    } else {
        let mut ids = related_ids.to_vec();
        ids.push(other_id.to_string());
        ids
    }
}

/// Toggles the relation `id -> other_id` and saves the entry.
///
/// Relations are one-directional: `other_id` is not touched.
pub fn run<B: KvBackend>(
    store: &GrimoireStore<B>,
    id: &str,
    other_id: &str,
) -> Result<CmdResult> {
    let entry = store
        .get_entries()?
        .into_iter()
        .find(|e| e.id == id)
        .ok_or_else(|| GrimoireError::NotFound(id.to_string()))?;
    if id == other_id {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::warning("An entry cannot relate to itself"));
        return Ok(result);
    }
    let patch = EntryPatch {
        related_ids: Some(toggle(&entry.related_ids, other_id)),
        ..Default::default()
    };
    update::run(store, id, patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, NewEntry};
    use crate::store::mem_backend::MemBackend;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn toggle_adds_then_removes() {
        let added = toggle(&ids(&["a"]), "b");
        assert_eq!(added, ids(&["a", "b"]));
        assert_eq!(toggle(&added, "b"), ids(&["a"]));
    }

    #[test]
    fn toggle_removes_duplicates_of_target() {
        assert_eq!(toggle(&ids(&["b", "a", "b"]), "b"), ids(&["a"]));
    }

    #[test]
    fn run_persists_one_directional_relation() {
        let store = GrimoireStore::new(MemBackend::new());
        let a = create::run(&store, NewEntry::new("notes", "a")).unwrap().affected_entries[0]
            .id
            .clone();
        let b = create::run(&store, NewEntry::new("notes", "b")).unwrap().affected_entries[0]
            .id
            .clone();

        run(&store, &a, &b).unwrap();
        let entries = store.get_entries().unwrap();
        assert_eq!(entries[0].related_ids, vec![b.clone()]);
        assert!(entries[1].related_ids.is_empty());

        run(&store, &a, &b).unwrap();
        assert!(store.get_entries().unwrap()[0].related_ids.is_empty());
    }

    #[test]
    fn dangling_target_is_allowed() {
        let store = GrimoireStore::new(MemBackend::new());
        let a = create::run(&store, NewEntry::new("notes", "a")).unwrap().affected_entries[0]
            .id
            .clone();
        run(&store, &a, "ghost").unwrap();
        assert_eq!(store.get_entries().unwrap()[0].related_ids, ids(&["ghost"]));
    }

    #[test]
    fn self_relation_is_refused() {
        let store = GrimoireStore::new(MemBackend::new());
        let a = create::run(&store, NewEntry::new("notes", "a")).unwrap().affected_entries[0]
            .id
            .clone();
        let result = run(&store, &a, &a).unwrap();
        assert!(result.affected_entries.is_empty());
        assert!(store.get_entries().unwrap()[0].related_ids.is_empty());
    }
}
