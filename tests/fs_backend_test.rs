use grimoire::model::{Entry, Settings, Theme};
use grimoire::store::backend::KvBackend;
use grimoire::store::fs_backend::FsBackend;
use grimoire::store::GrimoireStore;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, FsBackend) {
    let data_dir = TempDir::new().unwrap();
    let backend = FsBackend::new(data_dir.path(), "test-db");
    (data_dir, backend)
}

#[test]
fn test_missing_key_reads_none() {
    let (_dir, backend) = setup();
    assert_eq!(backend.get("entries").unwrap(), None);
}

#[test]
fn test_set_then_get() {
    let (dir, backend) = setup();
    backend.set("settings", &json!({"theme": "light"})).unwrap();

    assert_eq!(
        backend.get("settings").unwrap(),
        Some(json!({"theme": "light"}))
    );
    assert!(dir.path().join("test-db").join("settings.json").exists());
}

#[test]
fn test_atomic_write_leaves_no_tmp_files() {
    let (dir, backend) = setup();
    backend.set("entries", &json!([])).unwrap();
    backend.set("entries", &json!([1, 2])).unwrap();

    for entry in fs::read_dir(dir.path().join("test-db")).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[test]
fn test_invalid_keys_are_rejected() {
    let (_dir, backend) = setup();
    assert!(backend.set("../escape", &json!(1)).is_err());
    assert!(backend.get("").is_err());
}

#[test]
fn test_corrupt_file_is_an_error() {
    let (dir, backend) = setup();
    let root = dir.path().join("test-db");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("entries.json"), "not json").unwrap();
    assert!(backend.get("entries").is_err());
}

#[test]
fn test_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = GrimoireStore::new(FsBackend::new(dir.path(), "db"));
        let entry = Entry::new("notes".into(), "Moon water".into(), "Full moon".into());
        store.save_entries(&[entry]).unwrap();
        store
            .save_settings(&Settings {
                theme: Theme::Parchment,
                ..Default::default()
            })
            .unwrap();
    }

    let store = GrimoireStore::new(FsBackend::new(dir.path(), "db"));
    let entries = store.get_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Moon water");
    assert_eq!(store.get_settings().unwrap().theme, Theme::Parchment);
}

#[test]
fn test_seeding_happens_once_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = GrimoireStore::new(FsBackend::new(dir.path(), "db"));
    let first = store.get_collections().unwrap();
    let path = dir.path().join("db").join("collections.json");
    let on_disk = fs::read_to_string(&path).unwrap();

    let second = store.get_collections().unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&path).unwrap(), on_disk);
}

#[test]
fn test_entries_file_uses_interchange_field_names() {
    let dir = TempDir::new().unwrap();
    let store = GrimoireStore::new(FsBackend::new(dir.path(), "db"));
    let entry = Entry::new("herbs".into(), "Sage".into(), "Cleansing".into());
    store.save_entries(&[entry]).unwrap();

    let raw = fs::read_to_string(dir.path().join("db").join("entries.json")).unwrap();
    assert!(raw.contains("\"collectionId\""));
    assert!(raw.contains("\"contentMD\""));
    assert!(raw.contains("\"createdAt\""));
}
