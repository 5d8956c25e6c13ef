//! # Passcode issuer
//!
//! Generates six-digit numeric passcodes and records them as the single
//! [`PendingVerification`] for an email. Issuing again for the same email replaces
//! the previous record, so only the newest code can ever verify.
//!
//! The issuer never touches the credential store and never validates the email;
//! [`super::AuthFlow`] does both before calling [`PasscodeIssuer::issue`].

use std::sync::Arc;

use chrono::Duration;
use rand::Rng;
use store::{PendingProfile, PendingStore, PendingVerification};

use crate::clock::Clock;
use crate::error::Result;

/// Number of digits in a passcode.
pub const PASSCODE_LENGTH: usize = 6;

/// How long a passcode stays valid after issuance.
pub const PASSCODE_TTL_SECS: i64 = 5 * 60;

/// Generate a passcode: each digit drawn independently and uniformly.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..PASSCODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[derive(Clone)]
pub struct PasscodeIssuer {
    pending: Arc<dyn PendingStore>,
    clock: Arc<dyn Clock>,
}

impl PasscodeIssuer {
    pub fn new(pending: Arc<dyn PendingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { pending, clock }
    }

    /// Issue a fresh code for `email`, replacing any outstanding one.
    pub async fn issue(&self, email: &str, profile: Option<PendingProfile>) -> Result<String> {
        let code = generate_code();
        let expires_at = self.clock.now() + Duration::seconds(PASSCODE_TTL_SECS);

        self.pending
            .set(PendingVerification {
                email: email.to_string(),
                code: code.clone(),
                expires_at,
                pending_profile: profile,
            })
            .await?;

        tracing::debug!(%email, %expires_at, "passcode issued");
        Ok(code)
    }

    pub(crate) fn pending(&self) -> &dyn PendingStore {
        self.pending.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ManualClock;
    use store::MemoryPendingStore;

    #[test]
    fn test_generate_code_shape() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), PASSCODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_code_varies() {
        let codes: std::collections::HashSet<String> = (0..50).map(|_| generate_code()).collect();
        assert!(codes.len() > 1);
    }

    #[tokio::test]
    async fn test_issue_stores_code_with_expiry() {
        let pending = Arc::new(MemoryPendingStore::new());
        let clock = Arc::new(ManualClock::default());
        let issuer = PasscodeIssuer::new(pending.clone(), clock.clone());

        let code = issuer.issue("a@b.com", None).await.unwrap();

        let stored = pending.get("a@b.com").await.unwrap().unwrap();
        assert_eq!(stored.code, code);
        assert_eq!(stored.expires_at, clock.now() + Duration::minutes(5));
        assert!(stored.pending_profile.is_none());
    }

    #[tokio::test]
    async fn test_reissue_overwrites() {
        let pending = Arc::new(MemoryPendingStore::new());
        let issuer = PasscodeIssuer::new(pending.clone(), Arc::new(ManualClock::default()));

        issuer.issue("a@b.com", None).await.unwrap();
        let second = issuer.issue("a@b.com", None).await.unwrap();

        assert_eq!(pending.get("a@b.com").await.unwrap().unwrap().code, second);
    }
}
