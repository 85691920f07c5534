//! Synchronous PIN gateway adapter.
//!
//! Flow: bearer grant (cached) → server-generated 4-digit passcode →
//! one submit call with an immediate numeric result code → optional
//! status-check polling keyed by the operation id.

pub mod auth;
pub mod models;
pub mod passcode;
mod payment;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::credentials::CredentialCache;
use crate::errors::{ErrorKind, PaymentError};
use crate::payment::{PaymentRequest, PaymentResponse};
use crate::providers::{PaymentProvider, ProviderKind};
use crate::resilience::AttemptOutcome;
use crate::status::TransactionStatus;
use crate::transport::Transport;

use auth::BearerIssuer;

pub const PROVIDER_NAME: &str = "pinpay";

const REQUIRED_CREDENTIALS: &[&str] = &["username", "password", "client_id"];

/// Adapter for the synchronous PIN-authenticated gateway.
pub struct PinPayProvider {
    pub(super) config: Arc<ProviderConfig>,
    pub(super) transport: Arc<dyn Transport>,
    pub(super) credentials: CredentialCache,
    pub(super) issuer: BearerIssuer,
    pub(super) base_url: String,
    /// Cache key for the bearer credential: the account's client id.
    pub(super) account_key: String,
}

impl PinPayProvider {
    pub fn new(
        config: ProviderConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, PaymentError> {
        validate(&config)?;

        let config = Arc::new(config);
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let account_key = config
            .credential("client_id")
            .unwrap_or_default()
            .to_string();
        let issuer = BearerIssuer::new(Arc::clone(&config), Arc::clone(&transport));

        Ok(Self {
            credentials: CredentialCache::new(config.session_ttl()),
            config,
            transport,
            issuer,
            base_url,
            account_key,
        })
    }
}

#[async_trait]
impl PaymentProvider for PinPayProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::PinDirect
    }

    async fn is_available(&self) -> bool {
        self.bearer_token().await.is_ok()
    }

    async fn process_payment(&self, request: &PaymentRequest) -> AttemptOutcome<PaymentResponse> {
        self.submit_payment(request).await
    }

    async fn get_status(&self, transaction_id: &str) -> Result<TransactionStatus, PaymentError> {
        self.check_status(transaction_id).await
    }

    fn validate_config(&self) -> Result<(), PaymentError> {
        validate(&self.config)
    }

    fn invalidate_credentials(&self) {
        self.credentials.invalidate(&self.account_key);
    }
}

fn validate(config: &ProviderConfig) -> Result<(), PaymentError> {
    for field in REQUIRED_CREDENTIALS {
        if config.credential(field).unwrap_or("").is_empty() {
            return Err(PaymentError::new(
                ErrorKind::InvalidRequest,
                format!("missing required credential: {field}"),
            )
            .with_provider(PROVIDER_NAME));
        }
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
