//! # Storage seams for identities, notes, and pending passcodes
//!
//! Every piece of state the application touches sits behind one of three async
//! traits, so the auth flow and the notes layer never depend on a concrete backend.
//! [`crate::MemoryStore`] and [`crate::MemoryPendingStore`] implement them in
//! process memory; the `api` crate adds a PostgreSQL credential store behind its
//! `server` feature.
//!
//! | Trait | Keyed by | Used for |
//! |-------|----------|----------|
//! | [`PendingStore`] | email | One outstanding passcode per address. Replace-on-write, compare-and-delete on consume, set-if-absent on restore. |
//! | [`CredentialStore`] | id / email / provider id | Durable identities. Insert-only. |
//! | [`NoteStore`] | owner id | Notes, always filtered by owner. |
//!
//! The traits are object safe (`async_trait`) so they can be injected as
//! `Arc<dyn ...>` and swapped for an external cache or database per deployment.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Identity, NewIdentity, Note, PendingVerification};

/// Ephemeral passcode records, keyed by email.
///
/// Each method must be atomic for a single key. Concurrent `set` calls for the
/// same email race and the last write wins.
#[async_trait]
pub trait PendingStore: Send + Sync {
    /// The current record for `email`, expired or not.
    async fn get(&self, email: &str) -> Result<Option<PendingVerification>>;

    /// Store `pending`, replacing any record for the same email.
    async fn set(&self, pending: PendingVerification) -> Result<()>;

    /// Remove the record for `email`, returning it.
    async fn delete(&self, email: &str) -> Result<Option<PendingVerification>>;

    /// Remove the record for `email` only if it still carries `code` and is live
    /// at `now`.
    ///
    /// Returns `true` when this call removed it. A `false` means another caller
    /// consumed it first, a newer code replaced it, or the window closed.
    async fn consume(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<bool>;

    /// Put back a record taken by [`consume`](Self::consume) when the step after
    /// it failed. Does nothing if a record for the email exists again.
    ///
    /// Returns `true` when `pending` was stored.
    async fn restore(&self, pending: PendingVerification) -> Result<bool>;
}

/// Durable identity records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>>;

    async fn find_by_provider_id(&self, provider_id: &str) -> Result<Option<Identity>>;

    /// Insert a new identity. Fails with [`StoreError::Conflict`](crate::StoreError::Conflict)
    /// if the email or provider id is already taken.
    async fn create_identity(&self, identity: NewIdentity) -> Result<Identity>;
}

/// Notes scoped by owner.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn create_note(&self, owner: Uuid, text: &str) -> Result<Note>;

    /// All notes of `owner`, oldest first.
    async fn list_notes(&self, owner: Uuid) -> Result<Vec<Note>>;

    /// Delete note `id` if `owner` owns it. Returns whether a note was removed.
    async fn delete_note(&self, owner: Uuid, id: Uuid) -> Result<bool>;
}
