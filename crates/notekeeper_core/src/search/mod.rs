//! List filtering helpers for presentation code.
//!
//! # Responsibility
//! - Provide pure filters over `NoteStore::list` output.
//! - Keep filtering out of the store itself.

pub mod title_filter;
