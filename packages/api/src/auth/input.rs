//! Request payloads and input checks for the passcode flows.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use store::Identity;

/// Body of a signup request-code call.
///
/// Fields are optional so that a missing field is reported as a validation
/// failure instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupCodeRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "dateOfBirth")]
    pub dob: Option<String>,
}

/// Body of a login request-code call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginCodeRequest {
    pub email: Option<String>,
}

/// Body of a verify call, signup or login.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyRequest {
    pub email: Option<String>,
    #[serde(alias = "code")]
    pub otp: Option<String>,
}

/// A freshly minted session together with the identity it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSuccess {
    pub token: String,
    pub user: Identity,
}

/// Trim and lowercase an email so it can be used as a key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `local@domain.tld` with no whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !host.ends_with('.'),
        None => false,
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping only the date.
pub fn parse_date_of_birth(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// `Some(trimmed)` unless the field is absent or blank.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        for email in ["a@b.com", "first.last@sub.example.org", "x+tag@d.io"] {
            assert!(is_valid_email(email), "{email}");
        }
    }

    #[test]
    fn test_invalid_emails() {
        for email in [
            "", "plain", "@b.com", "a@", "a@b", "a@.com", "a@b.", "a b@c.com", "a@b@c.com", "a@b..",
        ] {
            assert!(!is_valid_email(email), "{email}");
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@B.Com "), "a@b.com");
    }

    #[test]
    fn test_parse_date_of_birth() {
        let expected = NaiveDate::from_ymd_opt(2000, 1, 1);
        assert_eq!(parse_date_of_birth("2000-01-01"), expected);
        assert_eq!(parse_date_of_birth("2000-01-01T00:00:00Z"), expected);
        assert_eq!(parse_date_of_birth("2000-02-30"), None);
        assert_eq!(parse_date_of_birth("yesterday"), None);
        assert_eq!(parse_date_of_birth(""), None);
    }

    #[test]
    fn test_verify_request_accepts_code_alias() {
        let req: VerifyRequest =
            serde_json::from_str(r#"{"email":"a@b.com","code":"123456"}"#).unwrap();
        assert_eq!(req.otp.as_deref(), Some("123456"));
    }
}
