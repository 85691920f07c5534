//! Canonical error taxonomy.
//!
//! # Design Decisions
//! - Closed, flat set of error kinds; no provider-specific subtypes
//! - `retryable` is set explicitly by the raiser; kinds only supply a default
//! - Errors carry an optional boxed cause for diagnostics, never exposed raw

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical error kinds shared by every provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidRequest,
    AuthenticationFailed,
    InsufficientFunds,
    PaymentDeclined,
    NetworkError,
    Timeout,
    ProviderError,
    ValidationError,
    PaymentExpired,
    Cancelled,
}

impl ErrorKind {
    /// Wire-level code for the kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::AuthenticationFailed => "AUTHENTICATION_FAILED",
            ErrorKind::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ErrorKind::PaymentDeclined => "PAYMENT_DECLINED",
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::ProviderError => "PROVIDER_ERROR",
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::PaymentExpired => "PAYMENT_EXPIRED",
            ErrorKind::Cancelled => "CANCELLED",
        }
    }

    /// Default retryability classification for raisers that do not decide
    /// explicitly. Transient transport-level kinds only; everything else is
    /// terminal unless the raiser says otherwise.
    pub fn default_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::NetworkError | ErrorKind::Timeout | ErrorKind::ProviderError
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Canonical payment error returned by every public operation.
///
/// Callers never see a raw transport or serde error; adapters map those into
/// the most specific kind available and attach the original as a cause.
#[derive(Debug)]
pub struct PaymentError {
    kind: ErrorKind,
    message: String,
    provider: Option<String>,
    retryable: bool,
    details: HashMap<String, Value>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PaymentError {
    /// Create an error with the kind's default retryability.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            retryable: kind.default_retryable(),
            kind,
            message: message.into(),
            provider: None,
            details: HashMap::new(),
            source: None,
        }
    }

    /// Create a validation error for a specific field.
    pub fn validation(field: &str, message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::ValidationError, format!("{field}: {message}"))
            .with_detail("field", Value::String(field.to_string()))
    }

    /// Tag the error with the provider that raised it.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Override the retryable flag. Retryability is a business decision made
    /// at the raise site, not a structural property of the kind.
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Attach a structured detail for diagnostics.
    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn details(&self) -> &HashMap<String, Value> {
        &self.details
    }
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.provider {
            Some(provider) => write!(f, "[{}] {}: {}", provider, self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for PaymentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
