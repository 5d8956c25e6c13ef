use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::models::{Identity, NewIdentity, Note, PendingVerification};
use crate::repo::{CredentialStore, NoteStore, PendingStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory identities and notes, for tests and database-less development.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    identities: Arc<Mutex<HashMap<Uuid, Identity>>>,
    notes: Arc<Mutex<Vec<Note>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        Ok(lock(&self.identities).get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        Ok(lock(&self.identities)
            .values()
            .find(|i| i.email == email)
            .cloned())
    }

    async fn find_by_provider_id(&self, provider_id: &str) -> Result<Option<Identity>> {
        Ok(lock(&self.identities)
            .values()
            .find(|i| i.external_provider_id.as_deref() == Some(provider_id))
            .cloned())
    }

    async fn create_identity(&self, new: NewIdentity) -> Result<Identity> {
        let mut identities = lock(&self.identities);

        if identities.values().any(|i| i.email == new.email) {
            return Err(StoreError::Conflict(format!("email {} already exists", new.email)));
        }
        if let Some(ref provider_id) = new.external_provider_id {
            if identities
                .values()
                .any(|i| i.external_provider_id.as_ref() == Some(provider_id))
            {
                return Err(StoreError::Conflict("provider id already exists".to_string()));
            }
        }

        let identity = Identity {
            id: Uuid::new_v4(),
            email: new.email,
            name: new.name,
            date_of_birth: new.date_of_birth,
            external_provider_id: new.external_provider_id,
            created_at: Utc::now(),
        };
        identities.insert(identity.id, identity.clone());
        Ok(identity)
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn create_note(&self, owner: Uuid, text: &str) -> Result<Note> {
        let note = Note {
            id: Uuid::new_v4(),
            text: text.to_string(),
            user_id: owner,
            created_at: Utc::now(),
        };
        lock(&self.notes).push(note.clone());
        Ok(note)
    }

    async fn list_notes(&self, owner: Uuid) -> Result<Vec<Note>> {
        Ok(lock(&self.notes)
            .iter()
            .filter(|n| n.user_id == owner)
            .cloned()
            .collect())
    }

    async fn delete_note(&self, owner: Uuid, id: Uuid) -> Result<bool> {
        let mut notes = lock(&self.notes);
        let before = notes.len();
        notes.retain(|n| !(n.id == id && n.user_id == owner));
        Ok(notes.len() != before)
    }
}

/// Process-local pending passcodes.
///
/// Not shared between server instances. Multi-instance deployments need a
/// [`PendingStore`] backed by an external cache.
#[derive(Clone, Debug, Default)]
pub struct MemoryPendingStore {
    pending: Arc<Mutex<HashMap<String, PendingVerification>>>,
}

impl MemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PendingStore for MemoryPendingStore {
    async fn get(&self, email: &str) -> Result<Option<PendingVerification>> {
        Ok(lock(&self.pending).get(email).cloned())
    }

    async fn set(&self, pending: PendingVerification) -> Result<()> {
        lock(&self.pending).insert(pending.email.clone(), pending);
        Ok(())
    }

    async fn delete(&self, email: &str) -> Result<Option<PendingVerification>> {
        Ok(lock(&self.pending).remove(email))
    }

    async fn consume(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<bool> {
        let mut pending = lock(&self.pending);
        match pending.get(email) {
            Some(p) if p.accepts(code, now) => {
                pending.remove(email);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn restore(&self, record: PendingVerification) -> Result<bool> {
        match lock(&self.pending).entry(record.email.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending(email: &str, code: &str) -> PendingVerification {
        PendingVerification {
            email: email.to_string(),
            code: code.to_string(),
            expires_at: Utc::now() + Duration::minutes(5),
            pending_profile: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_identity() {
        let store = MemoryStore::new();

        assert!(store.find_by_email("a@b.com").await.unwrap().is_none());

        let created = store
            .create_identity(NewIdentity::from_email("a@b.com", None))
            .await
            .unwrap();

        let by_email = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(by_email, created);
        let by_id = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id, created);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store
            .create_identity(NewIdentity::from_email("a@b.com", None))
            .await
            .unwrap();

        let err = store
            .create_identity(NewIdentity::from_email("a@b.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_by_provider_id() {
        let store = MemoryStore::new();
        let created = store
            .create_identity(NewIdentity {
                email: "g@b.com".to_string(),
                external_provider_id: Some("google-123".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let found = store.find_by_provider_id("google-123").await.unwrap();
        assert_eq!(found, Some(created));
        assert!(store.find_by_provider_id("google-999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_notes_scoped_by_owner() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let first = store.create_note(alice, "first").await.unwrap();
        store.create_note(alice, "second").await.unwrap();
        let bobs = store.create_note(bob, "bob's").await.unwrap();

        let notes = store.list_notes(alice).await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].text, "first");
        assert_eq!(notes[1].text, "second");

        // Bob cannot delete Alice's note.
        assert!(!store.delete_note(bob, first.id).await.unwrap());
        assert_eq!(store.list_notes(alice).await.unwrap().len(), 2);

        assert!(store.delete_note(alice, first.id).await.unwrap());
        assert!(!store.delete_note(alice, first.id).await.unwrap());
        assert_eq!(store.list_notes(alice).await.unwrap().len(), 1);
        assert_eq!(store.list_notes(bob).await.unwrap(), vec![bobs]);
    }

    #[tokio::test]
    async fn test_pending_set_replaces() {
        let store = MemoryPendingStore::new();
        store.set(pending("a@b.com", "111111")).await.unwrap();
        store.set(pending("a@b.com", "222222")).await.unwrap();

        let current = store.get("a@b.com").await.unwrap().unwrap();
        assert_eq!(current.code, "222222");
    }

    #[tokio::test]
    async fn test_pending_consume_is_compare_and_delete() {
        let store = MemoryPendingStore::new();
        store.set(pending("a@b.com", "111111")).await.unwrap();
        let now = Utc::now();

        assert!(!store.consume("a@b.com", "999999", now).await.unwrap());
        assert!(store.get("a@b.com").await.unwrap().is_some());

        assert!(store.consume("a@b.com", "111111", now).await.unwrap());
        assert!(!store.consume("a@b.com", "111111", now).await.unwrap());
        assert!(store.get("a@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pending_consume_rejects_lapsed_code() {
        let store = MemoryPendingStore::new();
        let record = pending("a@b.com", "111111");
        let after_window = record.expires_at + Duration::seconds(1);
        store.set(record).await.unwrap();

        assert!(!store.consume("a@b.com", "111111", after_window).await.unwrap());
        assert!(store.get("a@b.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_pending_restore_only_when_absent() {
        let store = MemoryPendingStore::new();
        let first = pending("a@b.com", "111111");

        assert!(store.restore(first.clone()).await.unwrap());
        assert_eq!(store.get("a@b.com").await.unwrap(), Some(first.clone()));

        // A newer code issued meanwhile wins.
        store.set(pending("a@b.com", "222222")).await.unwrap();
        assert!(!store.restore(first).await.unwrap());
        assert_eq!(store.get("a@b.com").await.unwrap().unwrap().code, "222222");
    }

    #[tokio::test]
    async fn test_pending_delete_returns_record() {
        let store = MemoryPendingStore::new();
        store.set(pending("a@b.com", "111111")).await.unwrap();

        let removed = store.delete("a@b.com").await.unwrap();
        assert_eq!(removed.map(|p| p.code), Some("111111".to_string()));
        assert!(store.delete("a@b.com").await.unwrap().is_none());
    }
}
