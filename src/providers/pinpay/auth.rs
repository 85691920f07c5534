//! Bearer credential issuance for the PIN gateway.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::credentials::{CredentialIssuer, IssuedCredential};
use crate::errors::{ErrorKind, PaymentError};
use crate::providers::pinpay::models::AuthResponse;
use crate::providers::pinpay::PROVIDER_NAME;
use crate::transport::{Transport, TransportRequest};

/// OAuth password-grant issuer. Invoked by the credential cache under the
/// per-key refresh lock, so at most one grant call runs at a time.
pub struct BearerIssuer {
    config: Arc<ProviderConfig>,
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl BearerIssuer {
    pub fn new(config: Arc<ProviderConfig>, transport: Arc<dyn Transport>) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            config,
            transport,
            base_url,
        }
    }

    fn auth_failed(message: impl Into<String>) -> PaymentError {
        // Retryable by decision, not by kind: the dispatcher invalidates the
        // cached credential on this kind, so a retry gets a fresh grant.
        PaymentError::new(ErrorKind::AuthenticationFailed, message)
            .with_provider(PROVIDER_NAME)
            .with_retryable(true)
    }
}

#[async_trait]
impl CredentialIssuer for BearerIssuer {
    async fn issue(&self, _key: &str) -> Result<IssuedCredential, PaymentError> {
        let form: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "password")
            .append_pair("username", self.config.credential("username").unwrap_or(""))
            .append_pair("password", self.config.credential("password").unwrap_or(""))
            .append_pair("client_id", self.config.credential("client_id").unwrap_or(""))
            .finish();

        let request = TransportRequest::post(
            format!("{}/authentification", self.base_url),
            form.into_bytes(),
            self.config.timeout(),
        )
        .with_header("Content-Type", "application/x-www-form-urlencoded");

        debug!(
            username = self.config.credential("username").unwrap_or(""),
            "requesting bearer grant"
        );

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| Self::auth_failed("authentication request failed").with_source(e))?;

        if !response.is_success() {
            return Err(Self::auth_failed(format!(
                "authentication failed with status {}",
                response.status
            )));
        }

        let auth: AuthResponse = serde_json::from_slice(&response.body)
            .map_err(|e| Self::auth_failed("failed to decode auth response").with_source(e))?;

        info!("bearer grant issued");

        // The gateway reports the lifetime as a string of seconds; fall back
        // to the cache default when it is absent or malformed.
        let ttl = auth
            .expires_in
            .parse::<u64>()
            .ok()
            .map(Duration::from_secs);

        Ok(IssuedCredential {
            secret: auth.access_token,
            ttl,
        })
    }
}
