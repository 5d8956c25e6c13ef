//! # User row
//!
//! [`User`] is the complete row of the `users` table, loaded with
//! [`sqlx::FromRow`]. Columns:
//!
//! - `id`: primary key (`UUID v4`), assigned by the database.
//! - `email`: unique, lower-cased.
//! - `name`, `dob`: optional profile captured at signup or from the provider.
//! - `google_id`: the federated subject id, unique when present.
//! - `created_at`: insertion time.
//!
//! [`User::into_identity`] converts it into the [`Identity`] the rest of the
//! application works with.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use store::Identity;
use uuid::Uuid;

/// Full user record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub google_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn into_identity(self) -> Identity {
        Identity {
            id: self.id,
            email: self.email,
            name: self.name,
            date_of_birth: self.dob,
            external_provider_id: self.google_id,
            created_at: self.created_at,
        }
    }
}
