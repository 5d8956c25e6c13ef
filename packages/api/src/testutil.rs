//! Fakes for exercising the auth flow without mail, OAuth, or wall-clock time.
//!
//! Compiled for this crate's unit tests and, for other crates, behind the
//! `testutil` feature:
//!
//! ```toml
//! [dev-dependencies]
//! api = { workspace = true, features = ["testutil"] }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::auth::{FederatedProfile, IdentityProvider};
use crate::clock::Clock;
use crate::error::Result;
use crate::notify::{DeliveryError, Notifier};

/// A clock that only moves when told to. Starts at 2026-01-01T00:00:00Z.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Records every delivered passcode. Can be armed to fail the next delivery.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail_next: AtomicBool,
}

impl RecordingNotifier {
    /// Make the next `deliver` call fail with a [`DeliveryError`].
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// The most recent code delivered to `email`.
    pub fn last_code(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, email: &str, code: &str) -> std::result::Result<(), DeliveryError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(DeliveryError("simulated delivery failure".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

/// An identity provider that accepts any callback and returns a fixed profile.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    profile: FederatedProfile,
}

impl StaticProvider {
    pub fn new(profile: FederatedProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl IdentityProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn authorization_url(&self) -> Result<String> {
        Ok("https://provider.example/authorize?state=static".to_string())
    }

    async fn exchange_code(&self, _code: &str, _state: &str) -> Result<FederatedProfile> {
        Ok(self.profile.clone())
    }
}
