//! # Google OAuth 2.0 identity provider
//!
//! Authorization Code flow with PKCE, exposed as an [`IdentityProvider`].
//!
//! ## Flow
//!
//! 1. **[`authorization_url`](GoogleOAuth::authorization_url)** builds the consent URL
//!    requesting `openid`, `email` and `profile`, and remembers the CSRF state with its
//!    PKCE verifier for 10 minutes.
//! 2. **[`exchange_code`](GoogleOAuth::exchange_code)** is driven by the
//!    `/auth/google/callback` route. It removes the matching state (one-time use,
//!    expiry checked), exchanges the code plus verifier for an access token, and
//!    fetches the profile from the userinfo endpoint.
//!
//! States live in process memory, like pending passcodes. A multi-instance
//! deployment needs sticky routing for the callback.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthorizationCode, CsrfToken, EndpointNotSet, EndpointSet, PkceCodeChallenge,
    PkceCodeVerifier, Scope, TokenResponse,
};
use reqwest::Client;
use serde::Deserialize;

use super::config::OAuthConfig;
use super::provider::{FederatedProfile, IdentityProvider};
use crate::clock::Clock;
use crate::error::{AuthError, Result};

const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const STATE_TTL_SECS: i64 = 10 * 60;

/// Google user info from API.
#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    email: Option<String>,
    name: Option<String>,
}

/// OAuth client type with auth URL and token URL set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

struct PendingState {
    pkce_verifier: String,
    expires_at: DateTime<Utc>,
}

/// Google OAuth handler.
pub struct GoogleOAuth {
    config: OAuthConfig,
    http: Client,
    clock: Arc<dyn Clock>,
    states: Mutex<HashMap<String, PendingState>>,
}

impl GoogleOAuth {
    pub fn new(config: OAuthConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        // The token endpoint must not follow redirects.
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        Ok(Self {
            config,
            http,
            clock,
            states: Mutex::new(HashMap::new()),
        })
    }

    fn create_client(&self) -> ConfiguredClient {
        BasicClient::new(self.config.client_id.clone())
            .set_client_secret(self.config.client_secret.clone())
            .set_auth_uri(self.config.auth_url.clone())
            .set_token_uri(self.config.token_url.clone())
            .set_redirect_uri(self.config.redirect_url.clone())
    }

    /// Remove and return the verifier for `state` if it has not expired.
    fn take_verifier(&self, state: &str) -> Option<String> {
        let now = self.clock.now();
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states.retain(|_, s| s.expires_at > now);
        states.remove(state).map(|s| s.pkce_verifier)
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuth {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn authorization_url(&self) -> Result<String> {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_state) = self
            .create_client()
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        let now = self.clock.now();
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states.retain(|_, s| s.expires_at > now);
        states.insert(
            csrf_state.secret().clone(),
            PendingState {
                pkce_verifier: pkce_verifier.secret().clone(),
                expires_at: now + Duration::seconds(STATE_TTL_SECS),
            },
        );

        Ok(auth_url.to_string())
    }

    async fn exchange_code(&self, code: &str, state: &str) -> Result<FederatedProfile> {
        let pkce_verifier = self
            .take_verifier(state)
            .ok_or_else(|| AuthError::Provider("Invalid or expired OAuth state".to_string()))?;

        let token_result = self
            .create_client()
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(&self.http)
            .await
            .map_err(|e| AuthError::Provider(format!("Token exchange failed: {e}")))?;

        let access_token = token_result.access_token().secret();

        let google_user: GoogleUser = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::Provider(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        Ok(FederatedProfile {
            provider_id: google_user.id,
            email: google_user.email,
            name: google_user.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::testutil::ManualClock;

    fn google(clock: Arc<ManualClock>) -> GoogleOAuth {
        let settings = Settings::from_toml(
            r#"
            [google]
            client_id = "id"
            client_secret = "secret"
            redirect_url = "http://localhost:5000/auth/google/callback"
            "#,
        )
        .unwrap();
        let config = OAuthConfig::google(&settings).unwrap().unwrap();
        GoogleOAuth::new(config, clock).unwrap()
    }

    fn state_of(url: &str) -> String {
        let parsed = reqwest::Url::parse(url).unwrap();
        parsed
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[tokio::test]
    async fn test_authorization_url_shape() {
        let oauth = google(Arc::new(ManualClock::default()));
        let url = oauth.authorization_url().await.unwrap();

        assert_eq!(oauth.name(), "google");
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("client_id=id"));
        assert!(url.contains("scope=openid+email+profile"));
    }

    #[tokio::test]
    async fn test_state_is_single_use() {
        let oauth = google(Arc::new(ManualClock::default()));
        let state = state_of(&oauth.authorization_url().await.unwrap());

        assert!(oauth.take_verifier(&state).is_some());
        assert!(oauth.take_verifier(&state).is_none());
    }

    #[tokio::test]
    async fn test_state_expires() {
        let clock = Arc::new(ManualClock::default());
        let oauth = google(clock.clone());
        let state = state_of(&oauth.authorization_url().await.unwrap());

        clock.advance(Duration::minutes(11));
        assert!(oauth.take_verifier(&state).is_none());
    }

    #[tokio::test]
    async fn test_unknown_state_rejected_before_network() {
        let oauth = google(Arc::new(ManualClock::default()));
        let result = oauth.exchange_code("code", "forged").await;
        assert!(matches!(result, Err(AuthError::Provider(_))));
    }
}
