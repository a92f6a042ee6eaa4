//! Title substring filter for list views.
//!
//! # Invariants
//! - Matching is case-insensitive.
//! - A blank query matches every note.
//! - Input order is preserved.

use crate::model::note::Note;

/// Filters `notes` whose title contains `query`, ignoring case.
pub fn filter_by_title<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return notes.iter().collect();
    }
    notes
        .iter()
        .filter(|note| note.title().to_lowercase().contains(&needle))
        .collect()
}
