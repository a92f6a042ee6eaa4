//! Core use-case services.
//!
//! # Responsibility
//! - Own the canonical note collection (`NoteStore`).
//! - Mediate the single-draft edit lifecycle (`EditSession`).
//! - Keep UI/FFI layers decoupled from storage details.

pub mod edit_session;
pub mod note_store;
