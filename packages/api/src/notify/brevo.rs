use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{DeliveryError, Notifier, PasscodeEmail};
use crate::settings::Settings;

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailBody {
    sender: BrevoEmailAddress,
    to: Vec<BrevoEmailAddress>,
    subject: String,
    html_content: String,
    text_content: String,
}

/// Sends passcodes through Brevo's transactional email API.
#[derive(Debug, Clone)]
pub struct BrevoNotifier {
    client: Client,
    api_key: String,
    sender_email: String,
    sender_name: Option<String>,
    app_name: String,
}

impl BrevoNotifier {
    /// `None` unless both an API key and a sender address are configured.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        if !settings.brevo.is_configured() {
            return None;
        }
        Some(Self {
            client: Client::new(),
            api_key: settings.brevo.api_key.clone()?.trim().to_string(),
            sender_email: settings.brevo.sender_email.clone()?.trim().to_string(),
            sender_name: settings.brevo.sender_name.clone(),
            app_name: settings.app.name.clone(),
        })
    }
}

#[async_trait]
impl Notifier for BrevoNotifier {
    async fn deliver(&self, email: &str, code: &str) -> Result<(), DeliveryError> {
        let mail = PasscodeEmail::render(&self.app_name, code);

        let body = BrevoSendEmailBody {
            sender: BrevoEmailAddress {
                email: self.sender_email.clone(),
                name: self.sender_name.clone(),
            },
            to: vec![BrevoEmailAddress {
                email: email.to_string(),
                name: None,
            }],
            subject: mail.subject,
            html_content: mail.html,
            text_content: mail.text,
        };

        let resp = self
            .client
            .post(BREVO_SEND_URL)
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(%email, error = %e, "Brevo request failed");
                DeliveryError(e.to_string())
            })?;

        let status = resp.status();
        if status.is_success() {
            tracing::info!(%email, "passcode email sent");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        tracing::error!(%email, %status, %body, "Brevo rejected passcode email");
        Err(DeliveryError(format!("Brevo send failed (status={status})")))
    }
}
