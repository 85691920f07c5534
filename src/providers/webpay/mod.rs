//! Web session gateway adapter.
//!
//! Flow: merchant session (cached, fixed TTL) → form-encoded checkout
//! payload + hosted payment URL returned pending → settlement arrives as a
//! webhook notification. No polling status check exists for this protocol.

pub mod models;
mod payment;
pub mod session;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::credentials::CredentialCache;
use crate::errors::{ErrorKind, PaymentError};
use crate::payment::{PaymentRequest, PaymentResponse};
use crate::providers::{NotificationData, PaymentProvider, ProviderKind};
use crate::resilience::AttemptOutcome;
use crate::status::TransactionStatus;
use crate::transport::Transport;

use session::SessionIssuer;

pub const PROVIDER_NAME: &str = "webpay";

/// Adapter for the session + webhook redirect gateway.
pub struct WebPayProvider {
    pub(super) config: Arc<ProviderConfig>,
    pub(super) credentials: CredentialCache,
    pub(super) issuer: SessionIssuer,
    pub(super) base_url: String,
    /// Cache key for the session credential.
    pub(super) merchant_id: String,
}

impl WebPayProvider {
    pub fn new(
        config: ProviderConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, PaymentError> {
        validate(&config)?;

        let config = Arc::new(config);
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let merchant_id = config
            .credential("merchant_id")
            .unwrap_or_default()
            .to_string();
        let issuer = SessionIssuer::new(Arc::clone(&config), transport);

        Ok(Self {
            credentials: CredentialCache::new(config.session_ttl()),
            config,
            issuer,
            base_url,
            merchant_id,
        })
    }
}

#[async_trait]
impl PaymentProvider for WebPayProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::WebSession
    }

    async fn is_available(&self) -> bool {
        self.credentials
            .get(&self.merchant_id, &self.issuer)
            .await
            .is_ok()
    }

    async fn process_payment(&self, request: &PaymentRequest) -> AttemptOutcome<PaymentResponse> {
        self.initiate_checkout(request).await
    }

    /// The gateway has no polling API; callers should branch on
    /// `kind().supports_status_polling()` and rely on notifications.
    async fn get_status(&self, transaction_id: &str) -> Result<TransactionStatus, PaymentError> {
        let mut status =
            TransactionStatus::pending(transaction_id.to_string(), transaction_id.to_string());
        status.message = "status check not supported, use webhook notifications".into();
        Ok(status)
    }

    async fn handle_notification(
        &self,
        notification: &NotificationData,
    ) -> Result<TransactionStatus, PaymentError> {
        self.apply_notification(notification)
    }

    fn validate_config(&self) -> Result<(), PaymentError> {
        validate(&self.config)
    }

    fn invalidate_credentials(&self) {
        self.credentials.invalidate(&self.merchant_id);
    }
}

fn validate(config: &ProviderConfig) -> Result<(), PaymentError> {
    if config.credential("merchant_id").unwrap_or("").is_empty() {
        return Err(PaymentError::new(
            ErrorKind::InvalidRequest,
            "missing required credential: merchant_id",
        )
        .with_provider(PROVIDER_NAME));
    }

    if config.base_url.is_empty() {
        return Err(
            PaymentError::new(ErrorKind::InvalidRequest, "base_url is required")
                .with_provider(PROVIDER_NAME),
        );
    }

    if config.timeout_secs == 0 {
        return Err(
            PaymentError::new(ErrorKind::InvalidRequest, "timeout must be positive")
                .with_provider(PROVIDER_NAME),
        );
    }

    Ok(())
}
