//! Shared application state and its production wiring.

use std::sync::Arc;

use anyhow::Context as _;
use api::auth::{GoogleOAuth, OAuthConfig};
use api::db::{self, PgStore};
use api::notify::{BrevoNotifier, LogNotifier, Notifier};
use api::{AuthFlow, Clock, NotesService, SessionTokenService, Settings, SystemClock};
use store::{CredentialStore, MemoryPendingStore, MemoryStore, NoteStore};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthFlow>,
    pub notes: NotesService,
    /// Base URL the federated callback redirects to.
    pub frontend_url: Arc<str>,
}

impl AppState {
    pub fn new(auth: AuthFlow, notes: NotesService, frontend_url: impl Into<Arc<str>>) -> Self {
        Self {
            auth: Arc::new(auth),
            notes,
            frontend_url: frontend_url.into(),
        }
    }

    /// Build the state from settings, choosing each collaborator by what is configured.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let secret = settings.jwt_secret().context("auth.jwt_secret must be set")?;
        let tokens = Arc::new(SessionTokenService::new(secret.as_bytes(), clock.clone()));

        let (credentials, notes): (Arc<dyn CredentialStore>, Arc<dyn NoteStore>) =
            match settings.database.url.as_deref() {
                Some(url) => {
                    let pool = db::connect(url)
                        .await
                        .context("Failed to connect to database")?;
                    let store = Arc::new(PgStore::new(pool));
                    let credentials: Arc<dyn CredentialStore> = store.clone();
                    let notes: Arc<dyn NoteStore> = store;
                    (credentials, notes)
                }
                None => {
                    tracing::warn!("database.url not set, identities and notes are kept in memory");
                    let store = Arc::new(MemoryStore::new());
                    let credentials: Arc<dyn CredentialStore> = store.clone();
                    let notes: Arc<dyn NoteStore> = store;
                    (credentials, notes)
                }
            };

        let notifier: Arc<dyn Notifier> = match BrevoNotifier::from_settings(settings) {
            Some(brevo) => Arc::new(brevo),
            None => {
                tracing::warn!("brevo not configured, passcodes will only be logged");
                Arc::new(LogNotifier)
            }
        };

        let mut auth = AuthFlow::new(
            credentials,
            Arc::new(MemoryPendingStore::new()),
            notifier,
            tokens,
            clock.clone(),
        );

        match OAuthConfig::google(settings)? {
            Some(config) => {
                auth = auth.with_provider(Arc::new(GoogleOAuth::new(config, clock)?));
                tracing::info!("google sign-in enabled");
            }
            None => tracing::info!("google sign-in disabled"),
        }

        Ok(Self::new(
            auth,
            NotesService::new(notes),
            settings.app.frontend_url.trim_end_matches('/'),
        ))
    }
}
