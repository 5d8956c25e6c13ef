//! Federated identity seam.
//!
//! A provider turns a browser redirect into a verified [`FederatedProfile`]. The
//! auth flow receives one as a constructor argument; nothing registers providers
//! globally.

use async_trait::async_trait;

use crate::error::Result;

/// Profile asserted by an external identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct FederatedProfile {
    /// The provider's stable subject id.
    pub provider_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short name used in routes and logs, e.g. `"google"`.
    fn name(&self) -> &'static str;

    /// URL to send the browser to in order to start the flow.
    async fn authorization_url(&self) -> Result<String>;

    /// Complete the flow from the callback's `code` and `state` parameters.
    async fn exchange_code(&self, code: &str, state: &str) -> Result<FederatedProfile>;
}
