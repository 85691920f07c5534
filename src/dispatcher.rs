//! Payment dispatcher: the crate's top-level orchestration layer.
//!
//! # Responsibilities
//! - Construct every enabled provider through the registry
//! - Validate and expiry-check requests before any wire call
//! - Probe provider availability and fail fast when the provider is down
//! - Wrap provider calls in the retry executor
//! - Invalidate cached credentials when a provider rejects them, so the
//!   following attempt re-authenticates
//!
//! # Data Flow
//! ```text
//! caller → Dispatcher::process_payment
//!     → PaymentRequest::validate / expiry check
//!     → resolve adapter (named or default)
//!     → availability probe (fail fast when the provider is down)
//!     → RetryExecutor::execute
//!         → PaymentProvider::process_payment
//!         → on AuthenticationFailed: invalidate_credentials
//!     → PaymentResponse | PaymentError (partial response in details)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{validate_config, ClientConfig};
use crate::errors::{ErrorKind, PaymentError};
use crate::observability;
use crate::payment::{PaymentRequest, PaymentResponse};
use crate::providers::{NotificationData, PaymentProvider};
use crate::registry::ProviderRegistry;
use crate::resilience::{FailedAttempt, RetryExecutor};
use crate::status::TransactionStatus;
use crate::transport::{HttpTransport, Transport};

/// Routes payment operations to configured provider adapters.
pub struct Dispatcher {
    providers: HashMap<String, Arc<dyn PaymentProvider>>,
    default_provider: String,
    executor: RetryExecutor<PaymentResponse>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("providers", &self.providers)
            .field("default_provider", &self.default_provider)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Build a dispatcher from a validated configuration, constructing every
    /// enabled provider the registry knows how to build.
    pub fn new(
        config: ClientConfig,
        registry: &ProviderRegistry,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, PaymentError> {
        validate_config(&config).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            PaymentError::new(ErrorKind::ValidationError, "invalid configuration")
                .with_detail("violations", Value::from(messages))
        })?;

        let mut providers: HashMap<String, Arc<dyn PaymentProvider>> = HashMap::new();
        for (name, provider_config) in &config.providers {
            if !provider_config.enabled {
                continue;
            }
            let adapter =
                registry.create(name, provider_config.clone(), Arc::clone(&transport))?;
            providers.insert(name.clone(), adapter);
        }

        if !providers.contains_key(&config.default_provider) {
            return Err(PaymentError::new(
                ErrorKind::InvalidRequest,
                format!(
                    "default provider {:?} is not enabled or not registered",
                    config.default_provider
                ),
            ));
        }

        info!(
            default_provider = %config.default_provider,
            providers = ?{
                let mut names: Vec<&str> = providers.keys().map(String::as_str).collect();
                names.sort_unstable();
                names
            },
            "dispatcher initialized"
        );

        Ok(Self {
            providers,
            default_provider: config.default_provider.clone(),
            executor: RetryExecutor::new(config.retry.clone()),
        })
    }

    /// Convenience constructor: built-in registry plus a shared reqwest
    /// transport built from the config's HTTP settings.
    pub fn from_config(config: ClientConfig) -> Result<Self, PaymentError> {
        let transport = HttpTransport::new(&config.http).map_err(|e| {
            PaymentError::new(ErrorKind::NetworkError, "failed to build HTTP client")
                .with_retryable(false)
                .with_source(e)
        })?;
        Self::new(
            config,
            &ProviderRegistry::with_builtin_providers(),
            Arc::new(transport),
        )
    }

    /// Execute a payment on the named provider, or the default when `provider`
    /// is `None`. Never cancelled mid-flight.
    pub async fn process_payment(
        &self,
        provider: Option<&str>,
        request: &PaymentRequest,
    ) -> Result<PaymentResponse, PaymentError> {
        self.process_payment_with_cancel(provider, request, &CancellationToken::new())
            .await
    }

    /// Execute a payment, honoring an external cancellation token. A token
    /// fired between attempts (or before the first) stops the operation with
    /// a `Cancelled` error; a response already in flight is discarded.
    pub async fn process_payment_with_cancel(
        &self,
        provider: Option<&str>,
        request: &PaymentRequest,
        cancel: &CancellationToken,
    ) -> Result<PaymentResponse, PaymentError> {
        request.validate()?;

        if request.is_expired() {
            return Err(PaymentError::new(
                ErrorKind::PaymentExpired,
                "payment request expired before dispatch",
            )
            .with_detail("reference", Value::String(request.reference.clone())));
        }

        let adapter = self.resolve(provider)?;
        let name = adapter.name().to_string();
        let trace_id = Uuid::new_v4();
        let span = info_span!(
            "process_payment",
            provider = %name,
            reference = %request.reference,
            %trace_id
        );

        async {
            if cancel.is_cancelled() {
                return Err(PaymentError::new(
                    ErrorKind::Cancelled,
                    "operation cancelled by caller",
                ));
            }

            // Fail fast on a provider that cannot take payments at all; the
            // probe rides the credential cache, so it costs one lookup once
            // the provider is warm.
            if !adapter.is_available().await {
                warn!("provider unavailable");
                observability::record_payment(&name, "unavailable");
                return Err(PaymentError::new(
                    ErrorKind::ProviderError,
                    "provider is currently unavailable",
                )
                .with_provider(name.clone())
                .with_retryable(false));
            }

            let outcome = self
                .executor
                .execute(cancel, &name, || {
                    let adapter = Arc::clone(&adapter);
                    async move {
                        let outcome = adapter.process_payment(request).await;
                        if let Err(failed) = &outcome {
                            // Drop the cached credential so the next attempt
                            // re-authenticates instead of replaying a token
                            // the provider has already rejected.
                            if failed.error.kind() == ErrorKind::AuthenticationFailed {
                                adapter.invalidate_credentials();
                            }
                        }
                        outcome
                    }
                })
                .await;

            match outcome {
                Ok(response) => {
                    info!(
                        transaction_id = %response.transaction_id,
                        status = %response.status,
                        "payment processed"
                    );
                    observability::record_payment(&name, "success");
                    Ok(response)
                }
                Err(failed) => {
                    warn!(error = %failed.error, "payment failed");
                    observability::record_payment(&name, failed.error.kind().code());
                    Err(attach_partial_response(failed, &name))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Check the status of a previously submitted transaction.
    pub async fn get_status(
        &self,
        provider: Option<&str>,
        transaction_id: &str,
    ) -> Result<TransactionStatus, PaymentError> {
        let adapter = self.resolve(provider)?;
        adapter.get_status(transaction_id).await
    }

    /// Feed a webhook notification payload to the provider that understands
    /// it. Providers without webhook support reject the call.
    pub async fn handle_notification(
        &self,
        provider: Option<&str>,
        notification: &NotificationData,
    ) -> Result<TransactionStatus, PaymentError> {
        let adapter = self.resolve(provider)?;
        adapter.handle_notification(notification).await
    }

    /// Whether the named provider (or the default) can currently take
    /// payments.
    pub async fn is_available(&self, provider: Option<&str>) -> Result<bool, PaymentError> {
        let adapter = self.resolve(provider)?;
        Ok(adapter.is_available().await)
    }

    /// Look up an adapter for direct use (capability inspection and the
    /// like).
    pub fn provider(&self, name: &str) -> Option<&Arc<dyn PaymentProvider>> {
        self.providers.get(name)
    }

    /// Names of the configured providers, sorted.
    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn resolve(&self, provider: Option<&str>) -> Result<Arc<dyn PaymentProvider>, PaymentError> {
        let name = provider.unwrap_or(&self.default_provider);
        self.providers.get(name).cloned().ok_or_else(|| {
            PaymentError::new(
                ErrorKind::InvalidRequest,
                format!("provider {name:?} is not configured"),
            )
        })
    }
}

/// Convert an exhausted attempt into the caller-facing error, preserving the
/// provider's last partial response in the error details.
fn attach_partial_response(
    failed: FailedAttempt<PaymentResponse>,
    provider: &str,
) -> PaymentError {
    let mut error = failed.error;
    if error.provider().is_none() {
        error = error.with_provider(provider.to_string());
    }
    if let Some(response) = failed.response {
        if let Ok(value) = serde_json::to_value(&response) {
            error = error.with_detail("last_response", value);
        }
    }
    error
}
