//! Note domain model.
//!
//! # Responsibility
//! - Define the single persisted record of the application.
//! - Own identity generation and timestamp shape.
//! - Provide draft and collection validation shared by store and session.
//!
//! # Invariants
//! - `id` is assigned once and never reassigned.
//! - `created_at` is immutable after construction.
//! - `created_at <= updated_at` whenever `updated_at` is set.
//! - Fields are private; only `NoteStore` mutates a note.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque note identifier.
///
/// Generated ids are UUID v4 strings, but persisted ids from older files may
/// use any non-empty string.
pub type NoteId = String;

/// Validation failures for notes, drafts and collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is empty after trim.
    EmptyTitle,
    /// Content is empty after trim.
    EmptyContent,
    /// Note id is empty.
    EmptyId,
    /// `updated_at` is earlier than `created_at`.
    UpdatedBeforeCreated(NoteId),
    /// Two notes in one collection share an id.
    DuplicateId(NoteId),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title must not be empty"),
            Self::EmptyContent => write!(f, "note content must not be empty"),
            Self::EmptyId => write!(f, "note id must not be empty"),
            Self::UpdatedBeforeCreated(id) => {
                write!(f, "note `{id}` has updatedAt earlier than createdAt")
            }
            Self::DuplicateId(id) => write!(f, "duplicate note id: `{id}`"),
        }
    }
}

impl Error for NoteValidationError {}

/// Persisted note record.
///
/// Serialized field names follow the on-disk JSON schema
/// (`id, title, content, createdAt, updatedAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    id: NoteId,
    title: String,
    /// HTML fragment, opaque to core.
    content: String,
    created_at: DateTime<Utc>,
    /// `None` until the first successful edit.
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl Note {
    /// Creates a fresh note with a generated id and `updated_at = None`.
    pub(crate) fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: generate_note_id(),
            title: title.into(),
            content: content.into(),
            created_at: now_timestamp(),
            updated_at: None,
        }
    }

    /// Rebuilds a note whose identity already exists externally.
    ///
    /// Used by bulk snapshot paths (`saveNotes`) where the caller hands back
    /// notes it previously received from core.
    ///
    /// # Errors
    /// - Returns `NoteValidationError` when `Note::validate` fails.
    pub fn restore(
        id: impl Into<NoteId>,
        title: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Result<Self, NoteValidationError> {
        let note = Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            created_at,
            updated_at,
        };
        note.validate()?;
        Ok(note)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns whether this note was edited after creation.
    pub fn is_edited(&self) -> bool {
        self.updated_at.is_some()
    }

    /// Replaces title/content and stamps `updated_at`.
    ///
    /// `updated_at` never falls behind `created_at`, even under clock skew.
    pub(crate) fn apply_edit(&mut self, title: impl Into<String>, content: impl Into<String>) {
        self.title = title.into();
        self.content = content.into();
        self.updated_at = Some(now_timestamp().max(self.created_at));
    }

    /// Checks structural invariants of a single note.
    ///
    /// Title/content emptiness is a draft rule, not a record rule: notes
    /// written by older versions are still accepted on load.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.id.trim().is_empty() {
            return Err(NoteValidationError::EmptyId);
        }
        if let Some(updated_at) = self.updated_at {
            if updated_at < self.created_at {
                return Err(NoteValidationError::UpdatedBeforeCreated(self.id.clone()));
            }
        }
        Ok(())
    }
}

/// Validates a title/content pair before it may be persisted.
pub fn validate_draft(title: &str, content: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    if content.trim().is_empty() {
        return Err(NoteValidationError::EmptyContent);
    }
    Ok(())
}

/// Validates every note and rejects duplicate ids.
pub fn validate_collection(notes: &[Note]) -> Result<(), NoteValidationError> {
    let mut seen = HashSet::with_capacity(notes.len());
    for note in notes {
        note.validate()?;
        if !seen.insert(note.id.as_str()) {
            return Err(NoteValidationError::DuplicateId(note.id.clone()));
        }
    }
    Ok(())
}

fn generate_note_id() -> NoteId {
    Uuid::new_v4().to_string()
}

// Millisecond precision matches the ISO strings produced by the UI runtime.
fn now_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::{validate_collection, validate_draft, Note, NoteValidationError};
    use chrono::{Duration, Utc};

    #[test]
    fn new_note_has_no_update_timestamp() {
        let note = Note::new("A", "<p>x</p>");
        assert!(!note.id().is_empty());
        assert!(note.updated_at().is_none());
        assert!(!note.is_edited());
    }

    #[test]
    fn apply_edit_keeps_identity_and_orders_timestamps() {
        let mut note = Note::new("A", "<p>x</p>");
        let id = note.id().to_string();
        let created_at = note.created_at();

        note.apply_edit("B", "<p>y</p>");
        assert_eq!(note.id(), id);
        assert_eq!(note.created_at(), created_at);
        assert_eq!(note.title(), "B");
        assert!(note.updated_at().expect("edited note has updatedAt") >= created_at);
    }

    #[test]
    fn validate_draft_rejects_whitespace_only_fields() {
        assert_eq!(
            validate_draft("  ", "<p>x</p>"),
            Err(NoteValidationError::EmptyTitle)
        );
        assert_eq!(
            validate_draft("A", "\n\t"),
            Err(NoteValidationError::EmptyContent)
        );
        assert!(validate_draft("A", "<p>x</p>").is_ok());
    }

    #[test]
    fn restore_rejects_updated_before_created() {
        let created_at = Utc::now();
        let err = Note::restore(
            "n1",
            "A",
            "x",
            created_at,
            Some(created_at - Duration::seconds(5)),
        )
        .expect_err("inverted timestamps must be rejected");
        assert_eq!(err, NoteValidationError::UpdatedBeforeCreated("n1".into()));
    }

    #[test]
    fn validate_collection_rejects_duplicate_ids() {
        let now = Utc::now();
        let first = Note::restore("same", "A", "x", now, None).unwrap();
        let second = Note::restore("same", "B", "y", now, None).unwrap();
        assert_eq!(
            validate_collection(&[first, second]),
            Err(NoteValidationError::DuplicateId("same".into()))
        );
    }

    #[test]
    fn serializes_with_camel_case_keys_and_null_updated_at() {
        let note = Note::new("A", "<p>x</p>");
        let value = serde_json::to_value(&note).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").expect("key present").is_null());
    }

    #[test]
    fn deserializes_missing_updated_at_as_none() {
        let raw = r#"{"id":"n1","title":"A","content":"x","createdAt":"2024-05-01T10:00:00.000Z"}"#;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert!(note.updated_at().is_none());
    }
}
