//! Session bootstrap for the web gateway.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::credentials::{CredentialIssuer, IssuedCredential};
use crate::errors::{ErrorKind, PaymentError};
use crate::providers::webpay::PROVIDER_NAME;
use crate::transport::{Transport, TransportRequest};

/// Issues checkout session ids, keyed by merchant id. The gateway does not
/// report a session lifetime, so the cache's configured TTL governs expiry.
pub struct SessionIssuer {
    config: Arc<ProviderConfig>,
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl SessionIssuer {
    pub fn new(config: Arc<ProviderConfig>, transport: Arc<dyn Transport>) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            config,
            transport,
            base_url,
        }
    }

    fn session_failed(message: impl Into<String>) -> PaymentError {
        PaymentError::new(ErrorKind::ProviderError, message)
            .with_provider(PROVIDER_NAME)
            .with_retryable(true)
    }
}

#[async_trait]
impl CredentialIssuer for SessionIssuer {
    async fn issue(&self, key: &str) -> Result<IssuedCredential, PaymentError> {
        let url = format!("{}/online/online.php?merchantid={}", self.base_url, key);
        let request = TransportRequest::get(url, self.config.timeout());

        debug!(merchant_id = key, "creating checkout session");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| Self::session_failed("session request failed").with_source(e))?;

        if !response.is_success() {
            return Err(Self::session_failed(format!(
                "session creation failed with status {}",
                response.status
            )));
        }

        // The gateway answers with the raw session id as plain text, or the
        // literal "NOK" when the merchant id is rejected.
        let session_id = response.body_text().trim().to_string();
        if session_id.is_empty() || session_id == "NOK" {
            return Err(Self::session_failed(format!(
                "invalid session response: {session_id:?}"
            )));
        }

        info!(merchant_id = key, "checkout session created");

        Ok(IssuedCredential {
            secret: session_id,
            ttl: None,
        })
    }
}
