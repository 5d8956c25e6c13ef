//! # Error taxonomy for the auth flow and the notes layer
//!
//! Every failure surfaced to a caller is an [`AuthError`]. The variants follow the
//! taxonomy the HTTP layer maps to status codes:
//!
//! | Variant | Meaning | Side effects |
//! |---------|---------|--------------|
//! | [`Validation`](AuthError::Validation) | Malformed or missing input | None, checked before anything else |
//! | [`NotFound`](AuthError::NotFound) | Unknown identity (login) or note | None |
//! | [`Conflict`](AuthError::Conflict) | Signup verify for an email that already has an identity | Pending code kept |
//! | [`InvalidOrExpired`](AuthError::InvalidOrExpired) | Wrong code, no code, or lapsed window | Pending code kept |
//! | [`Delivery`](AuthError::Delivery) | The notifier could not send the passcode | Pending code kept |
//! | [`Authentication`](AuthError::Authentication) | Missing, malformed, or expired session token | None |
//!
//! `Provider`, `Token` and `Store` are internal failures. Their details are logged
//! and replaced by a generic message in [`AuthError::public_message`].
//!
//! Nothing here is retried automatically.

use store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("User already exists")]
    Conflict,

    #[error("Invalid or expired OTP")]
    InvalidOrExpired,

    #[error("Failed to send OTP: {0}")]
    Delivery(String),

    #[error("{0}")]
    Authentication(&'static str),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Token signing failed: {0}")]
    Token(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Stable message safe to show to the end user.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Delivery(_) => "Failed to send OTP".to_string(),
            AuthError::Provider(_) => "Authentication with the identity provider failed".to_string(),
            AuthError::Token(_) | AuthError::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_messages_hide_internals() {
        let err = AuthError::Delivery("smtp 550 mailbox unavailable".to_string());
        assert_eq!(err.public_message(), "Failed to send OTP");

        let err = AuthError::Store(StoreError::Backend("connection refused".to_string()));
        assert_eq!(err.public_message(), "Internal server error");

        assert_eq!(AuthError::InvalidOrExpired.public_message(), "Invalid or expired OTP");
        assert_eq!(
            AuthError::Validation("Invalid email format").public_message(),
            "Invalid email format"
        );
    }
}
