//! Authentication: passcodes, session tokens, federated login, and the flow
//! controller that ties them together.

#[cfg(feature = "server")]
mod config;
mod flow;
#[cfg(feature = "server")]
mod google;
mod input;
mod passcode;
mod provider;
mod token;

#[cfg(feature = "server")]
pub use config::OAuthConfig;
pub use flow::AuthFlow;
#[cfg(feature = "server")]
pub use google::GoogleOAuth;
pub use input::{
    is_valid_email, normalize_email, parse_date_of_birth, AuthSuccess, LoginCodeRequest,
    SignupCodeRequest, VerifyRequest,
};
pub use passcode::{generate_code, PasscodeIssuer, PASSCODE_LENGTH, PASSCODE_TTL_SECS};
pub use provider::{FederatedProfile, IdentityProvider};
pub use token::{SessionClaims, SessionTokenService, SESSION_TOKEN_TTL_SECS};
