//! Domain records and storage seams shared by the auth flow and the notes layer.

pub mod error;
pub mod models;
pub mod repo;

mod memory;
pub use memory::{MemoryPendingStore, MemoryStore};

pub use error::StoreError;
pub use models::{Identity, NewIdentity, Note, PendingProfile, PendingVerification};
pub use repo::{CredentialStore, NoteStore, PendingStore};
