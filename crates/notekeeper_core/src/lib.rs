//! Core domain logic for NoteKeeper.
//! This crate is the single source of truth for note persistence and the
//! edit-session lifecycle.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{validate_draft, Note, NoteId, NoteValidationError};
pub use model::preview::derive_html_preview;
pub use repo::note_file::{JsonFileStorage, NoteStorage, StorageError, StorageResult};
pub use search::title_filter::filter_by_title;
pub use service::edit_session::{Draft, EditSession, EditSessionError, SessionState};
pub use service::note_store::{NoteStore, NoteStoreError, NoteStoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Opens the JSON-file-backed store described by `config`.
///
/// Never fails: unreadable or missing storage recovers to an empty store.
pub fn open_store(config: &StoreConfig) -> NoteStore<JsonFileStorage> {
    NoteStore::open(JsonFileStorage::new(config.notes_path()))
}
