//! Flutter-facing bindings for NoteKeeper core.

pub mod api;
