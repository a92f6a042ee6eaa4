use notekeeper_core::{
    JsonFileStorage, Note, NoteStorage, NoteStore, NoteStoreError, NoteValidationError,
    StorageError, StorageResult,
};
use chrono::{Duration, SubsecRound, Utc};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::io;
use std::path::Path;

fn open_file_store(path: &Path) -> NoteStore<JsonFileStorage> {
    NoteStore::open(JsonFileStorage::new(path))
}

/// In-memory storage whose writes can be switched to fail.
#[derive(Default)]
struct FlakyStorage {
    notes: RefCell<Option<Vec<Note>>>,
    fail_writes: Cell<bool>,
    writes: Cell<u32>,
}

impl NoteStorage for FlakyStorage {
    fn read_all(&self) -> StorageResult<Option<Vec<Note>>> {
        Ok(self.notes.borrow().clone())
    }

    fn write_all(&self, notes: &[Note]) -> StorageResult<()> {
        if self.fail_writes.get() {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.writes.set(self.writes.get() + 1);
        *self.notes.borrow_mut() = Some(notes.to_vec());
        Ok(())
    }
}

#[test]
fn create_then_reload_returns_note_without_update_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");

    let created = {
        let mut store = open_file_store(&path);
        store.create("A", "<p>x</p>").unwrap()
    };

    let reloaded = open_file_store(&path);
    assert_eq!(reloaded.list().len(), 1);
    let note = &reloaded.list()[0];
    assert_eq!(note.id(), created.id());
    assert_eq!(note.title(), "A");
    assert_eq!(note.content(), "<p>x</p>");
    assert!(note.updated_at().is_none());
    assert_eq!(note.created_at(), created.created_at());
}

#[test]
fn mixed_mutations_round_trip_through_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    let mut store = open_file_store(&path);

    let first = store.create("first", "<p>1</p>").unwrap();
    let second = store.create("second", "<p>2</p>").unwrap();
    let third = store.create("third", "<p>3</p>").unwrap();
    store.update(second.id(), "second v2", "<p>2b</p>").unwrap();
    store.delete(first.id()).unwrap();
    store.create("fourth", "<p>4</p>").unwrap();

    let reloaded = open_file_store(&path);
    assert_eq!(reloaded.list(), store.list());
    let titles: Vec<_> = reloaded.list().iter().map(|n| n.title()).collect();
    assert_eq!(titles, vec!["second v2", "third", "fourth"]);
    assert_eq!(reloaded.get(third.id()).unwrap().content(), "<p>3</p>");
}

#[test]
fn ids_stay_unique_across_deletions() {
    let mut store = NoteStore::open(FlakyStorage::default());
    let mut seen = HashSet::new();

    for round in 0..20 {
        let note = store.create(format!("n{round}"), "<p>x</p>").unwrap();
        assert!(seen.insert(note.id().to_string()), "id reused: {}", note.id());
        if round % 3 == 0 {
            store.delete(note.id()).unwrap();
        }
    }
}

#[test]
fn update_keeps_identity_and_stamps_updated_at() {
    let mut store = NoteStore::open(FlakyStorage::default());
    let created = store.create("A", "<p>x</p>").unwrap();

    let updated = store.update(created.id(), "B", "<p>y</p>").unwrap();
    assert_eq!(updated.id(), created.id());
    assert_eq!(updated.created_at(), created.created_at());
    assert_eq!(updated.title(), "B");
    assert_eq!(updated.content(), "<p>y</p>");
    let updated_at = updated.updated_at().expect("update stamps updatedAt");
    assert!(updated_at >= created.created_at());
    assert_eq!(store.get(created.id()), Some(&updated));
}

#[test]
fn update_unknown_id_fails_and_leaves_collection_unchanged() {
    let mut store = NoteStore::open(FlakyStorage::default());
    store.create("A", "<p>x</p>").unwrap();
    let before = store.list().to_vec();

    let err = store.update("missing", "B", "<p>y</p>").unwrap_err();
    assert!(matches!(err, NoteStoreError::NotFound(id) if id == "missing"));
    assert_eq!(store.list(), before.as_slice());
}

#[test]
fn delete_unknown_id_is_idempotent_noop() {
    let storage = FlakyStorage::default();
    let mut store = NoteStore::open(storage);
    store.create("A", "<p>x</p>").unwrap();
    let before = store.list().to_vec();
    let writes_before = store.storage().writes.get();

    store.delete("missing").unwrap();
    store.delete("missing").unwrap();
    assert_eq!(store.list(), before.as_slice());
    assert_eq!(store.storage().writes.get(), writes_before);
}

#[test]
fn deleting_only_note_empties_memory_and_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    let mut store = open_file_store(&path);
    let note = store.create("only", "<p>x</p>").unwrap();

    store.delete(note.id()).unwrap();
    assert!(store.list().is_empty());
    assert!(open_file_store(&path).list().is_empty());
}

#[test]
fn create_rejects_blank_title_or_content() {
    let mut store = NoteStore::open(FlakyStorage::default());
    let err = store.create("   ", "<p>x</p>").unwrap_err();
    assert!(matches!(
        err,
        NoteStoreError::Validation(NoteValidationError::EmptyTitle)
    ));
    let err = store.create("A", "").unwrap_err();
    assert!(matches!(
        err,
        NoteStoreError::Validation(NoteValidationError::EmptyContent)
    ));
    assert!(store.is_empty());
}

#[test]
fn failed_writes_do_not_commit_in_memory() {
    let mut store = NoteStore::open(FlakyStorage::default());
    let kept = store.create("kept", "<p>x</p>").unwrap();
    let before = store.list().to_vec();

    store.storage().fail_writes.set(true);
    assert!(matches!(
        store.create("lost", "<p>y</p>").unwrap_err(),
        NoteStoreError::Io(_)
    ));
    assert!(matches!(
        store.update(kept.id(), "changed", "<p>z</p>").unwrap_err(),
        NoteStoreError::Io(_)
    ));
    assert!(matches!(
        store.delete(kept.id()).unwrap_err(),
        NoteStoreError::Io(_)
    ));
    assert_eq!(store.list(), before.as_slice());
}

#[test]
fn replace_all_persists_snapshot_and_rejects_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    let mut store = open_file_store(&path);
    let original = store.create("A", "<p>x</p>").unwrap();

    let snapshot = vec![
        original.clone(),
        Note::restore("external-1", "B", "<p>y</p>", original.created_at(), None).unwrap(),
    ];
    store.replace_all(snapshot.clone()).unwrap();
    assert_eq!(open_file_store(&path).list(), snapshot.as_slice());

    let err = store
        .replace_all(vec![original.clone(), original.clone()])
        .unwrap_err();
    assert!(matches!(
        err,
        NoteStoreError::Validation(NoteValidationError::DuplicateId(_))
    ));
    assert_eq!(store.list(), snapshot.as_slice());
}

#[test]
fn persisted_file_is_json_array_with_expected_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    let mut store = open_file_store(&path);
    let note = store.create("A", "<p>x</p>").unwrap();
    store.update(note.id(), "A2", "<p>x2</p>").unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let items = value.as_array().expect("top-level array");
    assert_eq!(items.len(), 1);
    let item = items[0].as_object().unwrap();
    for key in ["id", "title", "content", "createdAt", "updatedAt"] {
        assert!(item.contains_key(key), "missing key {key}");
    }
    assert!(item["updatedAt"].is_string());
}

#[test]
fn replace_all_rejects_blank_title_or_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    let mut store = open_file_store(&path);
    let kept = store.create("A", "<p>x</p>").unwrap();
    let raw_before = std::fs::read_to_string(&path).unwrap();
    let now = Utc::now();

    let blank_title = Note::restore("x1", "   ", "<p>y</p>", now, None).unwrap();
    let err = store.replace_all(vec![kept.clone(), blank_title]).unwrap_err();
    assert!(matches!(
        err,
        NoteStoreError::Validation(NoteValidationError::EmptyTitle)
    ));

    let blank_content = Note::restore("x2", "B", "", now, None).unwrap();
    let err = store.replace_all(vec![blank_content]).unwrap_err();
    assert!(matches!(
        err,
        NoteStoreError::Validation(NoteValidationError::EmptyContent)
    ));

    assert_eq!(store.list(), &[kept]);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), raw_before);
}

#[test]
fn update_never_stamps_before_future_created_at() {
    let mut store = NoteStore::open(FlakyStorage::default());
    let created_at = (Utc::now() + Duration::hours(1)).trunc_subsecs(3);
    let skewed = Note::restore("skewed", "A", "<p>x</p>", created_at, None).unwrap();
    store.replace_all(vec![skewed]).unwrap();

    let updated = store.update("skewed", "B", "<p>y</p>").unwrap();
    assert_eq!(updated.created_at(), created_at);
    assert_eq!(updated.updated_at(), Some(created_at));
}
