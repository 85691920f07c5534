//! Provider registry: maps provider names to adapter factories.
//!
//! # Design Decisions
//! - Registration is explicit and instance-scoped; there is no global
//!   registry and no self-registration at load time
//! - Factories construct adapters from validated configuration plus a shared
//!   transport, so tests can swap the wire layer wholesale

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::errors::{ErrorKind, PaymentError};
use crate::providers::{PaymentProvider, PinPayProvider, WebPayProvider};
use crate::transport::Transport;

/// Builds a provider adapter from its configuration and the shared transport.
pub type ProviderFactory = Box<
    dyn Fn(ProviderConfig, Arc<dyn Transport>) -> Result<Arc<dyn PaymentProvider>, PaymentError>
        + Send
        + Sync,
>;

/// Name → factory table consulted by the dispatcher at construction time.
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Empty registry, for callers wiring only custom adapters.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry pre-populated with the built-in adapters.
    pub fn with_builtin_providers() -> Self {
        let mut registry = Self::new();
        registry.register(crate::providers::pinpay::PROVIDER_NAME, |config, transport| {
            Ok(Arc::new(PinPayProvider::new(config, transport)?))
        });
        registry.register(crate::providers::webpay::PROVIDER_NAME, |config, transport| {
            Ok(Arc::new(WebPayProvider::new(config, transport)?))
        });
        registry
    }

    /// Register a factory under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(ProviderConfig, Arc<dyn Transport>) -> Result<Arc<dyn PaymentProvider>, PaymentError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Construct the adapter registered under `name`.
    pub fn create(
        &self,
        name: &str,
        config: ProviderConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Arc<dyn PaymentProvider>, PaymentError> {
        let factory = self.factories.get(name).ok_or_else(|| {
            PaymentError::new(
                ErrorKind::InvalidRequest,
                format!("no provider registered under {name:?}"),
            )
        })?;
        factory(config, transport)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered provider names, sorted for stable output.
    pub fn registered(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_builtin_providers()
    }
}
