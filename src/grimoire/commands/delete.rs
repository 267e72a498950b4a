use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::{GrimoireStore, KvBackend};
use tracing::{debug, info};

/// Hard-deletes the entry with `id`. Relations pointing at it are left dangling.
pub fn run<B: KvBackend>(store: &GrimoireStore<B>, id: &str) -> Result<CmdResult> {
    let mut entries = store.get_entries()?;
    let Some(pos) = entries.iter().position(|e| e.id == id) else {
        debug!(id, "delete of missing entry ignored");
        return Ok(CmdResult::default());
    };
    let removed = entries.remove(pos);
    store.save_entries(&entries)?;
    info!(id, "entry deleted");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Entry deleted: {}",
        removed.title
    )));
    Ok(result.with_affected_entries(vec![removed]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, NewEntry};
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn removes_only_the_target() {
        let store = GrimoireStore::new(MemBackend::new());
        let a = create::run(&store, NewEntry::new("notes", "a")).unwrap();
        create::run(&store, NewEntry::new("notes", "b")).unwrap();
        let id = a.affected_entries[0].id.clone();

        run(&store, &id).unwrap();

        let entries = store.get_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.iter().all(|e| e.id != id));
    }

    #[test]
    fn missing_id_writes_nothing() {
        let store = GrimoireStore::new(MemBackend::new());
        let result = run(&store, "nope").unwrap();
        assert!(result.affected_entries.is_empty());
        assert_eq!(store.backend().write_count(), 0);
    }

    #[test]
    fn relations_to_deleted_entry_dangle() {
        let store = GrimoireStore::new(MemBackend::new());
        let target = create::run(&store, NewEntry::new("notes", "target")).unwrap();
        let target_id = target.affected_entries[0].id.clone();
        let mut new = NewEntry::new("notes", "source");
        new.related_ids = vec![target_id.clone()];
        create::run(&store, new).unwrap();

        run(&store, &target_id).unwrap();

        let entries = store.get_entries().unwrap();
        assert_eq!(entries[0].related_ids, vec![target_id]);
    }
}
