//! Identity provider client.
//!
//! Authentication is delegated entirely to an external identity service
//! (GoTrue-style HTTP API): the hub only ever asks "who does this bearer
//! token belong to, and are they an admin?" and, for provisioning,
//! "create a confirmed account with the admin flag".

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("identity provider call timed out")]
    Timeout,

    #[error("identity provider rejected the request: {0}")]
    Rejected(String),

    #[error("identity provider error: {0}")]
    Upstream(String),
}

/// Resolved identity of an authenticated caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub is_admin: bool,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token to an identity, or fail
    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityError>;

    /// Create a confirmed account carrying the admin flag
    async fn create_admin_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Identity, IdentityError>;
}

// =============================================================================
// HTTP implementation
// =============================================================================

/// Wire shape of the provider's user object
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    email: String,
    #[serde(default)]
    user_metadata: ProviderUserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderUserMetadata {
    name: Option<String>,
    #[serde(rename = "isAdmin", default)]
    is_admin: bool,
}

impl From<ProviderUser> for Identity {
    fn from(user: ProviderUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.user_metadata.name,
            is_admin: user.user_metadata.is_admin,
        }
    }
}

/// HTTP client for the identity provider.
///
/// Constructed once at startup and injected (no process-wide singleton).
/// Every call is bounded by the configured timeout so a hung provider
/// cannot stall a request task indefinitely.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: String, service_key: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("HTTP client configuration is valid and should never fail");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        }
    }

    fn map_request_error(error: reqwest::Error) -> IdentityError {
        if error.is_timeout() {
            IdentityError::Timeout
        } else {
            IdentityError::Upstream(error.to_string())
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            return Err(IdentityError::InvalidToken);
        }

        let user: ProviderUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;
        Ok(user.into())
    }

    async fn create_admin_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Identity, IdentityError> {
        let body = json!({
            "email": email,
            "password": password,
            // Auto-confirm: no email server is configured for the hub
            "email_confirm": true,
            "user_metadata": {
                "name": name,
                "isAdmin": true,
            },
        });

        let response = self
            .client
            .post(format!("{}/auth/v1/admin/users", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IdentityError::Rejected(format!("{}: {}", status, message)));
        }

        let user: ProviderUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;
        Ok(user.into())
    }
}
