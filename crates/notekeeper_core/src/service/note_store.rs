//! Note persistence and reconciliation service.
//!
//! # Responsibility
//! - Own the canonical in-memory note collection.
//! - Assign identities and timestamps on create/update.
//! - Flush the whole collection to storage on every mutation.
//!
//! # Invariants
//! - A mutation commits to memory only after storage accepted it.
//! - Collection order is insertion order; delete removes in place.
//! - `load` never fails the caller; it recovers to an empty collection.
//! - Existing storage is never reset unless it was first moved aside; when
//!   it cannot be moved, mutations are refused until a successful `load`.
//! - Log events carry ids and counts only, never titles or content.

use crate::model::note::{validate_collection, validate_draft, Note, NoteId, NoteValidationError};
use crate::repo::note_file::{NoteStorage, StorageError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::time::Instant;

pub type NoteStoreResult<T> = Result<T, NoteStoreError>;

/// Errors surfaced by `NoteStore` mutations.
#[derive(Debug)]
pub enum NoteStoreError {
    /// Target note does not exist.
    NotFound(NoteId),
    /// Input violates note or collection rules.
    Validation(NoteValidationError),
    /// Storage medium failure; in-memory state is left untouched.
    Io(StorageError),
}

impl Display for NoteStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Validation(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for NoteStoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for NoteStoreError {
    fn from(value: StorageError) -> Self {
        Self::Io(value)
    }
}

/// Single source of truth for the note collection.
///
/// Owned by the application root and lent to `EditSession` / boundary code.
pub struct NoteStore<S: NoteStorage> {
    storage: S,
    notes: Vec<Note>,
    /// Set when storage holds data that could neither be read nor moved aside.
    writes_blocked: bool,
}

impl<S: NoteStorage> NoteStore<S> {
    /// Creates an empty, unloaded store over `storage`.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            notes: Vec::new(),
            writes_blocked: false,
        }
    }

    /// Creates a store and immediately loads it.
    pub fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.load();
        store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads durable storage into memory and returns the loaded collection.
    ///
    /// # Recovery
    /// - Absent storage is initialized to `[]`.
    /// - Corrupt, invalid or unreadable storage is quarantined, then
    ///   initialized to `[]`.
    /// - If quarantine fails, storage is left untouched and mutations fail
    ///   with `Io` until a later `load` succeeds.
    pub fn load(&mut self) -> &[Note] {
        let started_at = Instant::now();
        self.writes_blocked = false;
        self.notes = match self.storage.read_all() {
            Ok(Some(notes)) => {
                info!(
                    "event=store_load module=store status=ok count={} duration_ms={}",
                    notes.len(),
                    started_at.elapsed().as_millis()
                );
                notes
            }
            Ok(None) => {
                info!("event=store_load module=store status=init reason=missing");
                self.initialize_empty();
                Vec::new()
            }
            Err(err) => {
                let reason = match err {
                    StorageError::Io(_) => "unreadable",
                    StorageError::Corrupt(_) | StorageError::Invalid(_) => "corrupt",
                };
                warn!(
                    "event=store_load module=store status=recover reason={} error={}",
                    reason, err
                );
                self.recover_unreadable();
                Vec::new()
            }
        };
        &self.notes
    }

    /// Returns the canonical collection in insertion order.
    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id() == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Creates, persists and returns a new note with `updated_at = None`.
    pub fn create(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> NoteStoreResult<Note> {
        let title = title.into();
        let content = content.into();
        validate_draft(&title, &content)?;

        let note = Note::new(title, content);
        let mut candidate = self.notes.clone();
        candidate.push(note.clone());
        self.commit(candidate, "note_create", note.id())?;
        Ok(note)
    }

    /// Replaces title/content of an existing note and stamps `updated_at`.
    ///
    /// # Errors
    /// - `NotFound` when `id` is absent; the collection is unchanged.
    pub fn update(
        &mut self,
        id: &str,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> NoteStoreResult<Note> {
        let title = title.into();
        let content = content.into();
        let index = self
            .position(id)
            .ok_or_else(|| NoteStoreError::NotFound(id.to_string()))?;
        validate_draft(&title, &content)?;

        let mut candidate = self.notes.clone();
        candidate[index].apply_edit(title, content);
        let updated = candidate[index].clone();
        self.commit(candidate, "note_update", id)?;
        Ok(updated)
    }

    /// Removes the note with `id`. Absent ids are a no-op.
    pub fn delete(&mut self, id: &str) -> NoteStoreResult<()> {
        let Some(index) = self.position(id) else {
            info!(
                "event=note_delete module=store status=noop note_id={}",
                id
            );
            return Ok(());
        };

        let mut candidate = self.notes.clone();
        candidate.remove(index);
        self.commit(candidate, "note_delete", id)
    }

    /// Treats `notes` as the new canonical snapshot (bulk `saveNotes`).
    ///
    /// # Errors
    /// - `Validation` on duplicate ids, invalid timestamps, or a blank
    ///   title/content in any note.
    pub fn replace_all(&mut self, notes: Vec<Note>) -> NoteStoreResult<()> {
        validate_collection(&notes)?;
        for note in &notes {
            validate_draft(note.title(), note.content())?;
        }
        self.commit(notes, "notes_replace", "*")
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.notes.iter().position(|note| note.id() == id)
    }

    fn commit(&mut self, candidate: Vec<Note>, event: &str, note_id: &str) -> NoteStoreResult<()> {
        if self.writes_blocked {
            error!(
                "event={} module=store status=error note_id={} error_code=storage_unreadable",
                event, note_id
            );
            return Err(NoteStoreError::Io(StorageError::Io(io::Error::new(
                io::ErrorKind::Other,
                "existing note storage could not be read; refusing to overwrite it",
            ))));
        }
        let started_at = Instant::now();
        match self.storage.write_all(&candidate) {
            Ok(()) => {
                info!(
                    "event={} module=store status=ok note_id={} count={} duration_ms={}",
                    event,
                    note_id,
                    candidate.len(),
                    started_at.elapsed().as_millis()
                );
                self.notes = candidate;
                Ok(())
            }
            Err(err) => {
                error!(
                    "event={} module=store status=error note_id={} duration_ms={} error_code=persist_failed error={}",
                    event,
                    note_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    fn recover_unreadable(&mut self) {
        match self.storage.quarantine() {
            Ok(_) => self.initialize_empty(),
            Err(err) => {
                error!(
                    "event=store_load module=store status=error error_code=quarantine_failed error={}",
                    err
                );
                self.writes_blocked = true;
            }
        }
    }

    fn initialize_empty(&self) {
        if let Err(err) = self.storage.write_all(&[]) {
            error!(
                "event=store_load module=store status=error error_code=init_failed error={}",
                err
            );
        }
    }
}
