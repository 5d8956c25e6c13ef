//! Application settings.
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `config.toml`, then environment variables prefixed with `NOTES_` using `__`
//! between sections (e.g. `NOTES_AUTH__JWT_SECRET`, `NOTES_DATABASE__URL`).

use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use config::builder::DefaultState;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

impl Server {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct App {
    /// Product name used in outgoing emails.
    pub name: String,
    /// Where the federated callback sends the browser afterwards.
    pub frontend_url: String,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Auth {
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Database {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Brevo {
    pub api_key: Option<String>,
    pub sender_email: Option<String>,
    pub sender_name: Option<String>,
}

impl Brevo {
    pub fn is_configured(&self) -> bool {
        non_empty(&self.api_key) && non_empty(&self.sender_email)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Google {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_url: Option<String>,
}

impl Google {
    pub fn is_configured(&self) -> bool {
        non_empty(&self.client_id) && non_empty(&self.client_secret) && non_empty(&self.redirect_url)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub app: App,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub brevo: Brevo,
    #[serde(default)]
    pub google: Google,
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl Settings {
    /// Load settings from defaults, `config.toml` and the environment.
    pub fn new() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::defaults()?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("NOTES")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("app.cors_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Settings from a TOML document layered over the defaults.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("app.name", "HD Notes")?
            .set_default("app.frontend_url", "http://localhost:5173")?
            .set_default(
                "app.cors_origins",
                vec![
                    "http://localhost:3000",
                    "http://localhost:3001",
                    "http://localhost:5173",
                ],
            )
    }

    /// The token signing secret, required to start the server.
    pub fn jwt_secret(&self) -> Result<&str, ConfigError> {
        self.auth
            .jwt_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::NotFound("auth.jwt_secret".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.server.address(), "0.0.0.0:5000");
        assert_eq!(settings.app.name, "HD Notes");
        assert_eq!(settings.app.cors_origins.len(), 3);
        assert!(settings.database.url.is_none());
        assert!(!settings.brevo.is_configured());
        assert!(!settings.google.is_configured());
        assert!(settings.jwt_secret().is_err());
    }

    #[test]
    fn test_toml_overrides() {
        let settings = Settings::from_toml(
            r#"
            [server]
            port = 8080

            [auth]
            jwt_secret = "s3cret"

            [brevo]
            api_key = "key"
            sender_email = "noreply@example.com"

            [google]
            client_id = "id"
            client_secret = "secret"
            redirect_url = "http://localhost:8080/auth/google/callback"
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.jwt_secret().unwrap(), "s3cret");
        assert!(settings.brevo.is_configured());
        assert!(settings.brevo.sender_name.is_none());
        assert!(settings.google.is_configured());
    }

    #[test]
    fn test_blank_secret_is_missing() {
        let settings = Settings::from_toml("[auth]\njwt_secret = \"  \"\n").unwrap();
        assert!(settings.jwt_secret().is_err());
    }
}
