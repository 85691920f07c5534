//! Ephemeral provider credentials.
//!
//! # Data Flow
//! ```text
//! adapter → CredentialCache::get(key)
//!     → cache hit (unexpired): return stored secret
//!     → miss/expired: per-key refresh lock → CredentialIssuer::issue
//!         → network call (bearer grant or session bootstrap)
//!         → store with expiry, return fresh secret
//! ```

pub mod cache;

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::PaymentError;

pub use cache::CredentialCache;

/// A freshly issued credential, as returned by a provider.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    /// Opaque bearer token or session identifier.
    pub secret: String,

    /// Provider-reported lifetime. When the provider does not report one,
    /// the cache falls back to its configured default TTL.
    pub ttl: Option<Duration>,
}

/// Performs the provider-specific issuance call (authentication or session
/// bootstrap). Implementations are owned by the provider adapters.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn issue(&self, key: &str) -> Result<IssuedCredential, PaymentError>;
}
