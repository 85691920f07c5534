//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root configuration for the payment client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Provider used when the caller does not name one explicitly.
    pub default_provider: String,

    /// Per-provider settings, keyed by provider name.
    pub providers: HashMap<String, ProviderConfig>,

    /// Shared HTTP client settings.
    pub http: HttpConfig,

    /// Retry policy applied to provider calls.
    pub retry: RetryConfig,
}

impl ClientConfig {
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }
}

/// Settings for one payment provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Disabled providers are skipped by validation and never constructed.
    pub enabled: bool,

    /// Provider API base URL.
    pub base_url: String,

    /// Opaque credential material (username, password, merchant id, ...).
    pub credentials: HashMap<String, String>,

    /// Per-call deadline in seconds.
    pub timeout_secs: u64,

    /// Lifetime of a cached session credential. Session-style gateways do
    /// not report an expiry, so this is an operational tuning knob.
    pub session_ttl_secs: u64,

    /// Free-form provider options (e.g. brand name for hosted pages).
    pub options: HashMap<String, Value>,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn credential(&self, key: &str) -> Option<&str> {
        self.credentials.get(key).map(String::as_str)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: String::new(),
            credentials: HashMap::new(),
            timeout_secs: 30,
            session_ttl_secs: 300,
            options: HashMap::new(),
        }
    }
}

/// Shared HTTP client settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Default request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum idle connections kept per host.
    pub max_idle_per_host: usize,

    /// User-Agent header sent on every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_idle_per_host: 10,
            user_agent: format!("payrail/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts, including the initial one. Must be at least 1.
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,

    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: u64,

    /// Exponential growth factor. Must be greater than 1.0.
    pub multiplier: f64,

    /// When enabled, each delay is drawn from [delay/2, delay].
    pub enable_jitter: bool,
}

impl RetryConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 30_000,
            multiplier: 2.0,
            enable_jitter: true,
        }
    }
}
