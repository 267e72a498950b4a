use grimoire::api::GrimoireApi;
use grimoire::commands::{EntryPatch, NewEntry, SearchQuery};
use grimoire::config::GrimoireConfig;
use grimoire::editor::{DocumentSurface, FormatCommand, Mode};
use grimoire::store::mem_backend::MemBackend;

fn api() -> GrimoireApi<MemBackend> {
    GrimoireApi::new(MemBackend::new(), GrimoireConfig::default())
}

#[test]
fn create_update_delete_roundtrip() {
    let api = api();
    let created = api
        .create_entry(NewEntry::new("herbs", "Ginger").content("# Ginger\n\nGinger is warming."))
        .unwrap();
    let entry = created.affected_entries[0].clone();
    assert_eq!(entry.created_at, entry.updated_at);
    assert_eq!(api.entries().unwrap().len(), 1);

    api.update_entry(
        &entry.id,
        EntryPatch {
            title: Some("Ingefära".into()),
            ..Default::default()
        },
    )
    .unwrap();
    let updated = api.entries().unwrap().remove(0);
    assert_eq!(updated.title, "Ingefära");
    assert!(updated.updated_at > updated.created_at);

    api.delete_entry(&entry.id).unwrap();
    assert!(api.entries().unwrap().is_empty());
}

#[test]
fn listing_snippet_strips_repeated_title() {
    let api = api();
    api.create_entry(NewEntry::new("herbs", "Ginger").content("# Ginger\n\nGinger is warming."))
        .unwrap();
    let listed = api.recent(None, None).unwrap().listed_entries;
    assert_eq!(listed[0].snippet, "Ginger is warming.");
    assert_eq!(listed[0].collection_name, "Örter & växter");
}

#[test]
fn search_filters_by_collection() {
    let api = api();
    api.create_entry(NewEntry::new("herbs", "Rosemary").tags(vec!["memory".into()]))
        .unwrap();
    api.create_entry(NewEntry::new("notes", "Memory palace"))
        .unwrap();

    let all = api
        .search(&SearchQuery {
            text: "MEMORY".into(),
            collection_id: None,
        })
        .unwrap();
    assert_eq!(all.listed_entries.len(), 2);

    let herbs = api
        .search(&SearchQuery {
            text: "memory".into(),
            collection_id: Some("herbs".into()),
        })
        .unwrap();
    assert_eq!(herbs.listed_entries.len(), 1);
    assert_eq!(herbs.listed_entries[0].entry.title, "Rosemary");
}

#[test]
fn relations_toggle_one_way() {
    let api = api();
    let a = api.create_entry(NewEntry::new("notes", "a")).unwrap().affected_entries[0]
        .id
        .clone();
    let b = api.create_entry(NewEntry::new("notes", "b")).unwrap().affected_entries[0]
        .id
        .clone();

    api.toggle_relation(&a, &b).unwrap();
    let entries = api.entries().unwrap();
    let entry_a = entries.iter().find(|e| e.id == a).unwrap();
    let entry_b = entries.iter().find(|e| e.id == b).unwrap();
    assert_eq!(entry_a.related_ids, vec![b.clone()]);
    assert!(entry_b.related_ids.is_empty());
}

#[test]
fn visual_edit_saves_back_as_markdown() {
    let api = api();
    let id = api
        .create_entry(NewEntry::new("notes", "Spell").content("Light a candle"))
        .unwrap()
        .affected_entries[0]
        .id
        .clone();

    let mut session = api.edit_session(&id).unwrap();
    session.attach_surface(Box::new(DocumentSurface::new()));
    assert!(session.switch_mode(Mode::Visual));
    assert!(session.apply(FormatCommand::Heading(2)));
    assert!(session.switch_mode(Mode::Source));
    assert_eq!(session.markdown(), "## Light a candle");

    api.update_entry(
        &id,
        EntryPatch {
            content_md: Some(session.markdown().to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(api.entries().unwrap()[0].content_md, "## Light a candle");
}

#[test]
fn export_then_import_is_identity() {
    let source = api();
    source
        .create_entry(NewEntry::new("crystals", "Ametist").content("*lugnande*"))
        .unwrap();
    let bundle = source.export().unwrap();
    let json = serde_json::to_value(&bundle).unwrap();
    assert_eq!(json["version"], 2);

    let target = api();
    target.import(&json).unwrap();
    assert_eq!(target.export().unwrap(), bundle);
}
