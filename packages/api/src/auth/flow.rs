//! # Auth flow controller
//!
//! Orchestrates passcode signup, passcode login, federated login, and bearer
//! token checks. Per email the controller moves through
//!
//! ```text
//! NoPending ──request code──▶ CodeSent ──verify──▶ Verified
//!                                 │
//!                                 └──(wrong code / lapsed window)──▶ rejected, record kept
//! ```
//!
//! "Expired" and "invalid" are not stored states. They are derived at verify time
//! from the stored record, and there is no background sweep: a lapsed record stays
//! in the [`PendingStore`] until the next request-code call overwrites it, but it
//! never verifies again.
//!
//! ## Ordering inside a verify
//!
//! 1. Load the pending record; reject with `InvalidOrExpired` unless the submitted
//!    code matches exactly and the window is open.
//! 2. Signup: reject with `Conflict` if the email already has an identity.
//!    Login: reject with `NotFound` if it does not. The record is kept in both cases.
//! 3. Consume the record with an atomic compare-and-delete that rechecks the
//!    window. Losing that race (another verify won, a resend replaced the code, or
//!    the code lapsed in between) is `InvalidOrExpired`.
//! 4. Signup creates the identity and waits for the store to commit it. If that
//!    fails the consumed record is put back, unless a newer code exists by then.
//! 5. Mint the session token.
//!
//! Step 3 before step 4 is what makes a code single-use under concurrency.

use std::sync::Arc;

use store::{
    CredentialStore, Identity, NewIdentity, PendingProfile, PendingStore, PendingVerification,
    StoreError,
};
use uuid::Uuid;

use super::input::{
    is_valid_email, normalize_email, parse_date_of_birth, present, AuthSuccess,
    LoginCodeRequest, SignupCodeRequest, VerifyRequest,
};
use super::passcode::PasscodeIssuer;
use super::provider::{FederatedProfile, IdentityProvider};
use super::token::SessionTokenService;
use crate::clock::Clock;
use crate::error::{AuthError, Result};
use crate::notify::Notifier;

pub struct AuthFlow {
    credentials: Arc<dyn CredentialStore>,
    issuer: PasscodeIssuer,
    notifier: Arc<dyn Notifier>,
    tokens: Arc<SessionTokenService>,
    clock: Arc<dyn Clock>,
    provider: Option<Arc<dyn IdentityProvider>>,
}

impl AuthFlow {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        pending: Arc<dyn PendingStore>,
        notifier: Arc<dyn Notifier>,
        tokens: Arc<SessionTokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            issuer: PasscodeIssuer::new(pending, clock.clone()),
            notifier,
            tokens,
            clock,
            provider: None,
        }
    }

    /// Enable federated login through `provider`.
    pub fn with_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn provider(&self) -> Option<&dyn IdentityProvider> {
        self.provider.as_deref()
    }

    pub fn tokens(&self) -> &SessionTokenService {
        &self.tokens
    }

    /// Validate a signup request and send a passcode carrying its profile.
    pub async fn request_signup_code(&self, req: SignupCodeRequest) -> Result<()> {
        let (Some(email), Some(name), Some(dob)) =
            (present(&req.email), present(&req.name), present(&req.dob))
        else {
            return Err(AuthError::Validation("Missing required fields"));
        };

        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::Validation("Invalid email format"));
        }
        let date_of_birth =
            parse_date_of_birth(dob).ok_or(AuthError::Validation("Invalid date format"))?;

        let profile = PendingProfile {
            name: name.to_string(),
            date_of_birth,
        };
        self.send_code(&email, Some(profile)).await
    }

    /// Send a login passcode to an email that already has an identity.
    pub async fn request_login_code(&self, req: LoginCodeRequest) -> Result<()> {
        let Some(email) = present(&req.email) else {
            return Err(AuthError::Validation("Email required"));
        };

        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::Validation("Invalid email format"));
        }
        if self.credentials.find_by_email(&email).await?.is_none() {
            return Err(AuthError::NotFound("User not found"));
        }

        self.send_code(&email, None).await
    }

    async fn send_code(&self, email: &str, profile: Option<PendingProfile>) -> Result<()> {
        let code = self.issuer.issue(email, profile).await?;

        // The pending record stays even if delivery fails; a resend replaces it.
        if let Err(e) = self.notifier.deliver(email, &code).await {
            tracing::warn!(%email, error = %e, "passcode delivery failed");
            return Err(e.into());
        }

        tracing::info!(%email, "passcode sent");
        Ok(())
    }

    /// Verify a signup passcode and create the identity.
    pub async fn verify_signup(&self, req: VerifyRequest) -> Result<AuthSuccess> {
        let pending = self.check_code(&req).await?;
        let email = pending.email.clone();

        if self.credentials.find_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict);
        }

        self.consume(&pending).await?;

        let new = NewIdentity::from_email(email.clone(), pending.pending_profile.clone());
        let identity = match self.credentials.create_identity(new).await {
            Ok(identity) => identity,
            Err(e) => {
                self.restore(pending).await;
                return Err(match e {
                    StoreError::Conflict(_) => AuthError::Conflict,
                    other => other.into(),
                });
            }
        };

        tracing::info!(%email, id = %identity.id, "identity created");
        self.session_for(identity)
    }

    /// Verify a login passcode for an existing identity.
    pub async fn verify_login(&self, req: VerifyRequest) -> Result<AuthSuccess> {
        let pending = self.check_code(&req).await?;
        let email = pending.email.clone();

        let Some(identity) = self.credentials.find_by_email(&email).await? else {
            return Err(AuthError::NotFound("User not found"));
        };

        self.consume(&pending).await?;

        tracing::info!(%email, id = %identity.id, "passcode login");
        self.session_for(identity)
    }

    /// Step 1: the submitted code must match a live pending record.
    async fn check_code(&self, req: &VerifyRequest) -> Result<PendingVerification> {
        let (Some(email), Some(code)) = (present(&req.email), req.otp.as_deref()) else {
            return Err(AuthError::InvalidOrExpired);
        };
        let email = normalize_email(email);

        let Some(pending) = self.issuer.pending().get(&email).await? else {
            return Err(AuthError::InvalidOrExpired);
        };
        if !pending.accepts(code, self.clock.now()) {
            tracing::debug!(%email, "passcode rejected");
            return Err(AuthError::InvalidOrExpired);
        }

        Ok(pending)
    }

    async fn consume(&self, pending: &PendingVerification) -> Result<()> {
        let store = self.issuer.pending();
        if store.consume(&pending.email, &pending.code, self.clock.now()).await? {
            Ok(())
        } else {
            Err(AuthError::InvalidOrExpired)
        }
    }

    /// Give a consumed code back after the identity could not be created, unless a
    /// newer code has been issued since.
    async fn restore(&self, pending: PendingVerification) {
        let email = pending.email.clone();
        match self.issuer.pending().restore(pending).await {
            Ok(true) => tracing::debug!(%email, "passcode restored after failed signup"),
            Ok(false) => tracing::debug!(%email, "newer passcode issued, not restoring"),
            Err(e) => tracing::error!(%email, error = %e, "failed to restore passcode"),
        }
    }

    fn session_for(&self, identity: Identity) -> Result<AuthSuccess> {
        let token = self.tokens.issue(identity.id)?;
        Ok(AuthSuccess {
            token,
            user: identity,
        })
    }

    /// Authorization URL of the configured federated provider.
    pub async fn federated_authorization_url(&self) -> Result<String> {
        self.configured_provider()?.authorization_url().await
    }

    /// Complete a federated callback: exchange the code, then find or create the
    /// identity keyed by the provider's subject id.
    pub async fn federated_callback(&self, code: &str, state: &str) -> Result<AuthSuccess> {
        let provider = self.configured_provider()?;
        let profile = provider.exchange_code(code, state).await?;
        tracing::debug!(
            provider = provider.name(),
            subject = %profile.provider_id,
            "provider profile received"
        );
        self.federated_login(profile).await
    }

    /// Find or create the identity for a verified provider profile.
    pub async fn federated_login(&self, profile: FederatedProfile) -> Result<AuthSuccess> {
        if let Some(identity) = self
            .credentials
            .find_by_provider_id(&profile.provider_id)
            .await?
        {
            tracing::info!(id = %identity.id, "federated login");
            return self.session_for(identity);
        }

        let Some(email) = profile
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty())
        else {
            return Err(AuthError::Provider("profile has no email address".to_string()));
        };

        let new = NewIdentity {
            email: email.clone(),
            name: profile.name,
            date_of_birth: None,
            external_provider_id: Some(profile.provider_id),
        };
        let identity = match self.credentials.create_identity(new).await {
            Ok(identity) => identity,
            Err(StoreError::Conflict(_)) => return Err(AuthError::Conflict),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(%email, id = %identity.id, "identity created from federated profile");
        self.session_for(identity)
    }

    fn configured_provider(&self) -> Result<&dyn IdentityProvider> {
        self.provider()
            .ok_or(AuthError::NotFound("Identity provider not configured"))
    }

    /// Gate check for authenticated calls: verify the bearer token and load the
    /// identity it names.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Identity> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Err(AuthError::Authentication("No token provided"));
        };

        let id: Uuid = self.tokens.verify(token)?;

        match self.credentials.find_by_id(id).await? {
            Some(identity) => Ok(identity),
            None => {
                tracing::warn!(%id, "token names an unknown identity");
                Err(AuthError::Authentication("Invalid token"))
            }
        }
    }
}
