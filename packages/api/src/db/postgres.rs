use async_trait::async_trait;
use sqlx::PgPool;
use store::{CredentialStore, Identity, NewIdentity, Note, NoteStore, StoreError};
use uuid::Uuid;

use crate::models::{NoteRow, User};

type StoreResult<T> = std::result::Result<T, StoreError>;

/// Identities and notes in PostgreSQL.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        other => {
            tracing::error!(error = %other, "database query failed");
            StoreError::Backend(other.to_string())
        }
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Identity>> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        Ok(user.map(User::into_identity))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        Ok(user.map(User::into_identity))
    }

    async fn find_by_provider_id(&self, provider_id: &str) -> StoreResult<Option<Identity>> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE google_id = $1")
            .bind(provider_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        Ok(user.map(User::into_identity))
    }

    async fn create_identity(&self, identity: NewIdentity) -> StoreResult<Identity> {
        let user: User = sqlx::query_as(
            r#"
            INSERT INTO users (email, name, dob, google_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&identity.email)
        .bind(&identity.name)
        .bind(identity.date_of_birth)
        .bind(&identity.external_provider_id)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        Ok(user.into_identity())
    }
}

#[async_trait]
impl NoteStore for PgStore {
    async fn create_note(&self, owner: Uuid, text: &str) -> StoreResult<Note> {
        let row: NoteRow =
            sqlx::query_as("INSERT INTO notes (text, user_id) VALUES ($1, $2) RETURNING *")
                .bind(text)
                .bind(owner)
                .fetch_one(&self.pool)
                .await
                .map_err(backend)?;
        Ok(row.into_note())
    }

    async fn list_notes(&self, owner: Uuid) -> StoreResult<Vec<Note>> {
        let rows: Vec<NoteRow> =
            sqlx::query_as("SELECT * FROM notes WHERE user_id = $1 ORDER BY created_at, id")
                .bind(owner)
                .fetch_all(&self.pool)
                .await
                .map_err(backend)?;
        Ok(rows.into_iter().map(NoteRow::into_note).collect())
    }

    async fn delete_note(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}
