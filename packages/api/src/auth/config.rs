//! OAuth provider configuration from [`Settings`].

use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};

use crate::error::{AuthError, Result};
use crate::settings::Settings;

/// OAuth provider configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub auth_url: AuthUrl,
    pub token_url: TokenUrl,
    pub redirect_url: RedirectUrl,
}

impl OAuthConfig {
    /// Google OAuth config. `None` when the `google` section is incomplete.
    pub fn google(settings: &Settings) -> Result<Option<Self>> {
        let google = &settings.google;
        if !google.is_configured() {
            return Ok(None);
        }
        let (Some(client_id), Some(client_secret), Some(redirect_url)) = (
            google.client_id.clone(),
            google.client_secret.clone(),
            google.redirect_url.clone(),
        ) else {
            return Ok(None);
        };

        Ok(Some(Self {
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            auth_url: AuthUrl::new("https://accounts.google.com/o/oauth2/v2/auth".to_string())
                .map_err(|e| AuthError::Provider(e.to_string()))?,
            token_url: TokenUrl::new("https://oauth2.googleapis.com/token".to_string())
                .map_err(|e| AuthError::Provider(e.to_string()))?,
            redirect_url: RedirectUrl::new(redirect_url)
                .map_err(|e| AuthError::Provider(format!("invalid google.redirect_url: {e}")))?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_unconfigured() {
        let settings = Settings::from_toml("").unwrap();
        assert!(OAuthConfig::google(&settings).unwrap().is_none());
    }

    #[test]
    fn test_google_configured() {
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
        assert_eq!(config.client_id.as_str(), "id");
        assert_eq!(
            config.redirect_url.as_str(),
            "http://localhost:5000/auth/google/callback"
        );
    }

    #[test]
    fn test_google_bad_redirect() {
        let settings = Settings::from_toml(
            r#"
            [google]
            client_id = "id"
            client_secret = "secret"
            redirect_url = "not a url"
            "#,
        )
        .unwrap();
        assert!(matches!(
            OAuthConfig::google(&settings),
            Err(AuthError::Provider(_))
        ));
    }
}
