//! # Domain records for identities, notes, and pending passcodes
//!
//! These are the values that cross the storage seams in [`crate::repo`]. They are
//! `Serialize + Deserialize` so the `web` crate can return them as JSON without an
//! extra projection layer.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`Identity`] | A durable user record. Created once, never mutated or deleted by the application. |
//! | [`NewIdentity`] | The fields supplied when an identity is first created; the store assigns `id` and `created_at`. |
//! | [`Note`] | A text note owned by exactly one identity. |
//! | [`PendingVerification`] | An outstanding passcode for one email. At most one exists per email. |
//! | [`PendingProfile`] | Signup-only profile data carried by a pending verification until it is verified. |

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A durable user record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// Set only for identities created through a federated provider callback.
    pub external_provider_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for an identity that does not exist yet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewIdentity {
    pub email: String,
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub external_provider_id: Option<String>,
}

impl NewIdentity {
    /// An identity proven by passcode, optionally carrying the signup profile.
    pub fn from_email(email: impl Into<String>, profile: Option<PendingProfile>) -> Self {
        let (name, date_of_birth) = match profile {
            Some(p) => (Some(p.name), Some(p.date_of_birth)),
            None => (None, None),
        };
        Self {
            email: email.into(),
            name,
            date_of_birth,
            external_provider_id: None,
        }
    }
}

/// A text note scoped to its owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub text: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Profile captured at signup request time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingProfile {
    pub name: String,
    pub date_of_birth: NaiveDate,
}

/// An outstanding passcode for an email address.
///
/// A lapsed record stays until it is overwritten. Only [`PendingStore::consume`]
/// looks at `expires_at`, against the caller's clock.
///
/// [`PendingStore::consume`]: crate::PendingStore::consume
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingVerification {
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    /// Present for signup, absent for login.
    pub pending_profile: Option<PendingProfile>,
}

impl PendingVerification {
    /// Whether the record is still inside its validity window at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }

    /// Exact string comparison of the submitted code against a live record.
    pub fn accepts(&self, code: &str, now: DateTime<Utc>) -> bool {
        self.code == code && self.is_live(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending(code: &str, expires_at: DateTime<Utc>) -> PendingVerification {
        PendingVerification {
            email: "a@b.com".to_string(),
            code: code.to_string(),
            expires_at,
            pending_profile: None,
        }
    }

    #[test]
    fn test_accepts_exact_code_only() {
        let now = Utc::now();
        let p = pending("483920", now + Duration::minutes(5));
        assert!(p.accepts("483920", now));
        assert!(!p.accepts("483921", now));
        assert!(!p.accepts(" 483920", now));
        assert!(!p.accepts("", now));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let p = pending("000000", now);
        assert!(p.accepts("000000", now));
        assert!(!p.accepts("000000", now + Duration::milliseconds(1)));
    }

    #[test]
    fn test_new_identity_from_profile() {
        let dob = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let identity = NewIdentity::from_email(
            "a@b.com",
            Some(PendingProfile {
                name: "A".to_string(),
                date_of_birth: dob,
            }),
        );
        assert_eq!(identity.name.as_deref(), Some("A"));
        assert_eq!(identity.date_of_birth, Some(dob));
        assert!(identity.external_provider_id.is_none());

        let bare = NewIdentity::from_email("a@b.com", None);
        assert!(bare.name.is_none());
        assert!(bare.date_of_birth.is_none());
    }

    #[test]
    fn test_identity_json_shape() {
        let identity = Identity {
            id: Uuid::nil(),
            email: "a@b.com".to_string(),
            name: None,
            date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 1),
            external_provider_id: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&identity).unwrap();
        assert!(json.contains("\"dateOfBirth\":\"2000-01-01\""));
        assert!(json.contains("\"externalProviderId\":null"));
    }
}
