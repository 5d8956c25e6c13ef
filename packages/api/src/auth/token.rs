//! # Session token service
//!
//! Issues and verifies HS256 JWTs carrying an identity id (`sub`) and a fixed
//! one-hour expiry. Verification is stateless: the signing secret is all that is
//! needed, no store lookup.
//!
//! Expiry is checked against the injected [`Clock`] rather than by
//! `jsonwebtoken` itself, with no leeway. Every failure, whether a bad signature,
//! a malformed token or an elapsed window, surfaces as the same
//! [`AuthError::Authentication`].

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{AuthError, Result};

/// Lifetime of a session token.
pub const SESSION_TOKEN_TTL_SECS: i64 = 60 * 60;

const VERIFICATION_FAILED: &str = "Token verification failed";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct SessionTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl SessionTokenService {
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            clock,
        }
    }

    /// Mint a token for `identity_id`, valid for one hour from now.
    pub fn issue(&self, identity_id: Uuid) -> Result<String> {
        let iat = self.clock.now().timestamp();
        let claims = SessionClaims {
            sub: identity_id.to_string(),
            iat,
            exp: iat + SESSION_TOKEN_TTL_SECS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Token(e.to_string()))
    }

    /// Check signature and expiry, returning the identity id.
    pub fn verify(&self, token: &str) -> Result<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "session token rejected");
                AuthError::Authentication(VERIFICATION_FAILED)
            })?
            .claims;

        if self.clock.now().timestamp() >= claims.exp {
            tracing::debug!(sub = %claims.sub, "session token expired");
            return Err(AuthError::Authentication(VERIFICATION_FAILED));
        }

        Uuid::parse_str(&claims.sub).map_err(|_| AuthError::Authentication(VERIFICATION_FAILED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ManualClock;
    use chrono::Duration;

    fn service(clock: Arc<ManualClock>) -> SessionTokenService {
        SessionTokenService::new(b"test-secret", clock)
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service(Arc::new(ManualClock::default()));
        let id = Uuid::new_v4();

        let token = tokens.issue(id).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), id);
    }

    #[test]
    fn test_expires_after_one_hour() {
        let clock = Arc::new(ManualClock::default());
        let tokens = service(clock.clone());
        let token = tokens.issue(Uuid::new_v4()).unwrap();

        clock.advance(Duration::minutes(59));
        assert!(tokens.verify(&token).is_ok());

        clock.advance(Duration::minutes(1));
        assert!(matches!(
            tokens.verify(&token),
            Err(AuthError::Authentication(_))
        ));
    }

    #[test]
    fn test_rejects_other_secret() {
        let clock = Arc::new(ManualClock::default());
        let token = service(clock.clone()).issue(Uuid::new_v4()).unwrap();
        let other = SessionTokenService::new(b"another-secret", clock);

        assert!(matches!(other.verify(&token), Err(AuthError::Authentication(_))));
    }

    #[test]
    fn test_rejects_malformed() {
        let tokens = service(Arc::new(ManualClock::default()));
        for bad in ["", "not-a-token", "a.b.c", "Bearer x"] {
            assert!(matches!(tokens.verify(bad), Err(AuthError::Authentication(_))));
        }
    }

    #[test]
    fn test_rejects_tampered_payload() {
        let tokens = service(Arc::new(ManualClock::default()));
        let token = tokens.issue(Uuid::new_v4()).unwrap();
        let other = tokens.issue(Uuid::new_v4()).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(tokens.verify(&forged).is_err());
    }
}
