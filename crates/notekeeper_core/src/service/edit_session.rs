//! Single-draft edit session state machine.
//!
//! # Responsibility
//! - Track which note, if any, is open for editing.
//! - Validate drafts and delegate mutations to `NoteStore`.
//!
//! # Invariants
//! - At most one draft exists at a time; re-entrant opens are rejected.
//! - A failed action leaves both state and draft unchanged.
//! - `delete` is only reachable from `Editing`.

use crate::model::note::{validate_draft, Note, NoteId, NoteValidationError};
use crate::repo::note_file::{NoteStorage, StorageError};
use crate::service::note_store::{NoteStore, NoteStoreError};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// In-progress title/content pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub content: String,
}

/// Edit session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No draft is open.
    Idle,
    /// Draft for a note that does not exist yet.
    Creating { draft: Draft },
    /// Draft backed by an existing note.
    Editing { note_id: NoteId, draft: Draft },
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Creating { .. } => "creating",
            Self::Editing { .. } => "editing",
        }
    }
}

/// Errors from edit session actions.
#[derive(Debug)]
pub enum EditSessionError {
    /// A draft is already open.
    SessionBusy,
    /// Action is not available from the current state.
    InvalidState {
        action: &'static str,
        state: &'static str,
    },
    /// Draft failed title/content validation.
    Validation(NoteValidationError),
    /// Referenced note no longer exists.
    NotFound(NoteId),
    /// Storage failure; the draft is kept for retry.
    Io(StorageError),
}

impl Display for EditSessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionBusy => write!(f, "another note is already open for editing"),
            Self::InvalidState { action, state } => {
                write!(f, "`{action}` is not allowed while session is {state}")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditSessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for EditSessionError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<NoteStoreError> for EditSessionError {
    fn from(value: NoteStoreError) -> Self {
        match value {
            NoteStoreError::NotFound(id) => Self::NotFound(id),
            NoteStoreError::Validation(err) => Self::Validation(err),
            NoteStoreError::Io(err) => Self::Io(err),
        }
    }
}

/// Edit session over a borrowed `NoteStore`.
pub struct EditSession<'store, S: NoteStorage> {
    store: &'store mut NoteStore<S>,
    state: SessionState,
}

impl<'store, S: NoteStorage> EditSession<'store, S> {
    pub fn new(store: &'store mut NoteStore<S>) -> Self {
        Self {
            store,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the open draft, if any.
    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Creating { draft } | SessionState::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SessionState::Idle)
    }

    /// Read access to the underlying store for rendering.
    pub fn store(&self) -> &NoteStore<S> {
        &*self.store
    }

    /// Opens an empty draft for a new note.
    pub fn open_for_create(&mut self) -> Result<(), EditSessionError> {
        self.ensure_idle()?;
        self.state = SessionState::Creating {
            draft: Draft::default(),
        };
        debug!("event=session_open module=session status=ok mode=create");
        Ok(())
    }

    /// Opens a draft pre-filled from the canonical copy of `note_id`.
    pub fn open_for_edit(&mut self, note_id: &str) -> Result<(), EditSessionError> {
        self.ensure_idle()?;
        let note = self
            .store
            .get(note_id)
            .ok_or_else(|| EditSessionError::NotFound(note_id.to_string()))?;
        self.state = SessionState::Editing {
            note_id: note.id().to_string(),
            draft: Draft {
                title: note.title().to_string(),
                content: note.content().to_string(),
            },
        };
        debug!(
            "event=session_open module=session status=ok mode=edit note_id={}",
            note_id
        );
        Ok(())
    }

    /// Persists the draft and returns to `Idle`.
    ///
    /// # Errors
    /// - `Validation` when title or content is blank.
    /// - `InvalidState` when no draft is open.
    /// - `NotFound`/`Io` from the store.
    pub fn save(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Note, EditSessionError> {
        let title = title.into();
        let content = content.into();
        if self.is_idle() {
            return Err(self.invalid("save"));
        }
        validate_draft(&title, &content)?;

        let saved = match &self.state {
            SessionState::Creating { .. } => self.store.create(title, content)?,
            SessionState::Editing { note_id, .. } => {
                self.store.update(note_id, title, content)?
            }
            SessionState::Idle => return Err(self.invalid("save")),
        };
        info!(
            "event=session_save module=session status=ok note_id={}",
            saved.id()
        );
        self.state = SessionState::Idle;
        Ok(saved)
    }

    /// Discards the draft without persisting.
    pub fn cancel(&mut self) -> Result<(), EditSessionError> {
        if self.is_idle() {
            return Err(self.invalid("cancel"));
        }
        debug!(
            "event=session_cancel module=session status=ok from={}",
            self.state.name()
        );
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Deletes the note being edited and returns to `Idle`.
    pub fn delete(&mut self) -> Result<(), EditSessionError> {
        let note_id = match &self.state {
            SessionState::Editing { note_id, .. } => note_id.clone(),
            _ => return Err(self.invalid("delete")),
        };
        self.store.delete(&note_id)?;
        info!(
            "event=session_delete module=session status=ok note_id={}",
            note_id
        );
        self.state = SessionState::Idle;
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), EditSessionError> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(EditSessionError::SessionBusy)
        }
    }

    fn invalid(&self, action: &'static str) -> EditSessionError {
        EditSessionError::InvalidState {
            action,
            state: self.state.name(),
        }
    }
}
