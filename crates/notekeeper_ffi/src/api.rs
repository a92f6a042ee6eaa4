//! FFI use-case API for the presentation layer.
//!
//! # Responsibility
//! - Expose note listing, bulk snapshot and per-note CRUD to the UI.
//! - Translate core errors into stable `error_kind` strings.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Calls are stateless: each call opens the store under `data_dir`, so no
//!   process-wide note collection exists on this side of the boundary.
//! - A failed mutation never reports a partially applied collection.

use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use notekeeper_core::{
    core_version as core_version_inner, derive_html_preview, filter_by_title,
    init_logging as init_logging_inner, open_store, ping as ping_inner, JsonFileStorage, Note,
    NoteStore, NoteStoreError, StoreConfig,
};

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Note shape exchanged with the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    /// HTML fragment as produced by the editor.
    pub content: String,
    /// Plain-text card preview derived from `content`.
    pub preview_text: Option<String>,
    /// RFC 3339 timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp, `None` until first edit.
    pub updated_at: Option<String>,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesResponse {
    pub items: Vec<NoteItem>,
    /// Same vocabulary as `NoteActionResponse::error_kind`; `None` on success.
    pub error_kind: Option<String>,
    pub message: String,
}

impl NotesResponse {
    fn success(items: Vec<NoteItem>, message: String) -> Self {
        Self {
            items,
            error_kind: None,
            message,
        }
    }

    fn failure(response: NoteActionResponse) -> Self {
        Self {
            items: Vec::new(),
            error_kind: response.error_kind,
            message: response.message,
        }
    }
}

/// Mutation response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    /// Affected note id, when one exists.
    pub note_id: Option<String>,
    /// One of `not_found|validation|io|invalid_argument` on failure.
    pub error_kind: Option<String>,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note_id: Option<String>) -> Self {
        Self {
            ok: true,
            note_id,
            error_kind: None,
            message: message.into(),
        }
    }

    fn failure(kind: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            error_kind: Some(kind.to_string()),
            message: message.into(),
        }
    }

    fn from_store_error(op: &str, err: NoteStoreError) -> Self {
        let kind = match &err {
            NoteStoreError::NotFound(_) => "not_found",
            NoteStoreError::Validation(_) => "validation",
            NoteStoreError::Io(_) => "io",
        };
        Self::failure(kind, format!("{op} failed: {err}"))
    }
}

/// Returns all notes in insertion order (`getNotes`).
///
/// # FFI contract
/// - Sync call, file-backed.
/// - Missing or corrupt storage yields an empty list, never an error.
#[flutter_rust_bridge::frb(sync)]
pub fn get_notes(data_dir: String) -> NotesResponse {
    match with_store(&data_dir, |store| Ok(to_items(store.list().iter()))) {
        Ok(items) => {
            let message = format!("Loaded {} note(s).", items.len());
            NotesResponse::success(items, message)
        }
        Err(response) => NotesResponse::failure(response),
    }
}

/// Returns notes whose title contains `query`, ignoring case.
#[flutter_rust_bridge::frb(sync)]
pub fn search_notes(data_dir: String, query: String) -> NotesResponse {
    match with_store(&data_dir, |store| {
        Ok(to_items(filter_by_title(store.list(), &query).into_iter()))
    }) {
        Ok(items) => {
            let message = if items.is_empty() {
                "No results.".to_string()
            } else {
                format!("Found {} result(s).", items.len())
            };
            NotesResponse::success(items, message)
        }
        Err(response) => NotesResponse::failure(response),
    }
}

/// Replaces the whole collection with `items` (`saveNotes`).
///
/// # FFI contract
/// - Items must carry ids and timestamps previously issued by core.
/// - Invalid items reject the whole snapshot; storage is left untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn save_notes(data_dir: String, items: Vec<NoteItem>) -> NoteActionResponse {
    let notes = match items.into_iter().map(to_note).collect::<Result<Vec<_>, _>>() {
        Ok(notes) => notes,
        Err(message) => return NoteActionResponse::failure("invalid_argument", message),
    };
    let count = notes.len();
    with_store(&data_dir, |store| {
        store
            .replace_all(notes)
            .map(|()| NoteActionResponse::success(format!("Saved {count} note(s)."), None))
            .map_err(|err| NoteActionResponse::from_store_error("save_notes", err))
    })
    .unwrap_or_else(|response| response)
}

/// Creates one note.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(data_dir: String, title: String, content: String) -> NoteActionResponse {
    with_store(&data_dir, |store| {
        store
            .create(title, content)
            .map(|note| NoteActionResponse::success("Note created.", Some(note.id().to_string())))
            .map_err(|err| NoteActionResponse::from_store_error("note_create", err))
    })
    .unwrap_or_else(|response| response)
}

/// Replaces title/content of one note.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(
    data_dir: String,
    note_id: String,
    title: String,
    content: String,
) -> NoteActionResponse {
    with_store(&data_dir, |store| {
        store
            .update(&note_id, title, content)
            .map(|note| NoteActionResponse::success("Note updated.", Some(note.id().to_string())))
            .map_err(|err| NoteActionResponse::from_store_error("note_update", err))
    })
    .unwrap_or_else(|response| response)
}

/// Deletes one note; unknown ids succeed as a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(data_dir: String, note_id: String) -> NoteActionResponse {
    with_store(&data_dir, |store| {
        store
            .delete(&note_id)
            .map(|()| NoteActionResponse::success("Note deleted.", Some(note_id.clone())))
            .map_err(|err| NoteActionResponse::from_store_error("note_delete", err))
    })
    .unwrap_or_else(|response| response)
}

fn with_store<T>(
    data_dir: &str,
    f: impl FnOnce(&mut NoteStore<JsonFileStorage>) -> Result<T, NoteActionResponse>,
) -> Result<T, NoteActionResponse> {
    let config = StoreConfig::from_data_dir(data_dir).map_err(|err| {
        warn!("event=ffi_store_open module=ffi status=error error_code=bad_data_dir");
        NoteActionResponse::failure("invalid_argument", err)
    })?;
    let mut store = open_store(&config);
    f(&mut store)
}

fn to_items<'a>(notes: impl Iterator<Item = &'a Note>) -> Vec<NoteItem> {
    notes.map(to_item).collect()
}

fn to_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id().to_string(),
        title: note.title().to_string(),
        content: note.content().to_string(),
        preview_text: derive_html_preview(note.content()),
        created_at: format_timestamp(note.created_at()),
        updated_at: note.updated_at().map(format_timestamp),
    }
}

fn to_note(item: NoteItem) -> Result<Note, String> {
    let created_at = parse_timestamp(&item.created_at)?;
    let updated_at = item
        .updated_at
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;
    Note::restore(item.id, item.title, item.content, created_at, updated_at)
        .map_err(|err| err.to_string())
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| format!("invalid timestamp `{raw}`: {err}"))
}
