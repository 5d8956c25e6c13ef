use chrono::{DateTime, Utc};
use sqlx::FromRow;
use store::Note;
use uuid::Uuid;

/// Row of the `notes` table.
#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    pub id: Uuid,
    pub text: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl NoteRow {
    pub fn into_note(self) -> Note {
        Note {
            id: self.id,
            text: self.text,
            user_id: self.user_id,
            created_at: self.created_at,
        }
    }
}
