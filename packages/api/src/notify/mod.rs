//! # Passcode delivery
//!
//! [`Notifier`] is the seam between the auth flow and whatever actually sends
//! mail. Two implementations ship with the crate:
//!
//! - [`BrevoNotifier`] (`server` feature) posts to Brevo's transactional email API.
//! - [`LogNotifier`] writes the passcode to the log. Development only.
//!
//! [`PasscodeEmail`] renders the message both of them carry.

#[cfg(feature = "server")]
mod brevo;

#[cfg(feature = "server")]
pub use brevo::BrevoNotifier;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::AuthError;

/// The notifier could not hand the message off.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DeliveryError(pub String);

impl From<DeliveryError> for AuthError {
    fn from(err: DeliveryError) -> Self {
        AuthError::Delivery(err.0)
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, email: &str, code: &str) -> Result<(), DeliveryError>;
}

/// Subject and bodies of the passcode email.
#[derive(Debug, Clone, PartialEq)]
pub struct PasscodeEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl PasscodeEmail {
    pub fn render(app_name: &str, code: &str) -> Self {
        let subject = format!("Your {app_name} OTP");
        let text = format!("Your OTP is {code}. It expires in 5 minutes.");
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">{app_name} - OTP Verification</h2>
  <p>Your OTP code is:</p>
  <div style="background-color: #f4f4f4; padding: 20px; text-align: center; border-radius: 5px; margin: 20px 0;">
    <h1 style="color: #007bff; font-size: 32px; margin: 0; letter-spacing: 5px;">{code}</h1>
  </div>
  <p>This OTP will expire in 5 minutes.</p>
  <p>If you didn't request this OTP, please ignore this email.</p>
  <hr style="margin: 20px 0;">
  <p style="color: #666; font-size: 12px;">This is an automated email from {app_name}.</p>
</div>"#
        );
        Self { subject, text, html }
    }
}

/// Logs passcodes instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, email: &str, code: &str) -> Result<(), DeliveryError> {
        tracing::warn!(%email, %code, "no mail transport configured, passcode logged instead");
        Ok(())
    }
}
