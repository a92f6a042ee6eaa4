//! Domain model for persisted notes.
//!
//! # Responsibility
//! - Define the canonical note record and its JSON shape.
//! - Provide validation rules shared by store and edit session.
//!
//! # Invariants
//! - Every note is identified by a stable, unique `NoteId`.
//! - Deletion is a hard removal; no tombstones are kept.

pub mod note;
pub mod preview;
