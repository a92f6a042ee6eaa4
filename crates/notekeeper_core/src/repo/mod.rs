//! Storage layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the whole-collection storage contract used by `NoteStore`.
//! - Isolate file-system and JSON details from service orchestration.
//!
//! # Invariants
//! - Storage writes are all-or-nothing from a reader's point of view.
//! - Storage reads return semantic errors (`Corrupt`, `Invalid`) in addition
//!   to transport errors (`Io`).

pub mod note_file;
