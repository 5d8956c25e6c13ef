//! Notes access layer: create, list, and delete notes of an authenticated identity.
//!
//! Callers pass the identity id the gate already verified. A note owned by someone
//! else is indistinguishable from a missing one.

use std::sync::Arc;

use serde::Deserialize;
use store::{Note, NoteStore};
use uuid::Uuid;

use crate::error::{AuthError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateNoteRequest {
    pub text: Option<String>,
}

#[derive(Clone)]
pub struct NotesService {
    notes: Arc<dyn NoteStore>,
}

impl NotesService {
    pub fn new(notes: Arc<dyn NoteStore>) -> Self {
        Self { notes }
    }

    pub async fn create(&self, owner: Uuid, req: CreateNoteRequest) -> Result<Note> {
        let Some(text) = req.text.filter(|t| !t.trim().is_empty()) else {
            return Err(AuthError::Validation("Text required"));
        };
        let note = self.notes.create_note(owner, &text).await?;
        tracing::debug!(%owner, id = %note.id, "note created");
        Ok(note)
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<Note>> {
        Ok(self.notes.list_notes(owner).await?)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<()> {
        if self.notes.delete_note(owner, id).await? {
            tracing::debug!(%owner, %id, "note deleted");
            Ok(())
        } else {
            Err(AuthError::NotFound("Note not found"))
        }
    }
}
