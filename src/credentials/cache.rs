//! Concurrency-safe credential cache with TTL.
//!
//! # Responsibilities
//! - Hand out only unexpired credentials
//! - Serialize refreshes per provider key: concurrent callers hitting an
//!   empty or expired entry trigger exactly one issuance call
//! - Let unrelated keys refresh independently, never contending
//!
//! # Design Decisions
//! - Lock striping by key: a DashMap of per-key async mutexes guards the
//!   issuance call; the entry map itself is only touched in short
//!   non-awaiting critical sections
//! - Nothing is cached when issuance fails

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::credentials::CredentialIssuer;
use crate::errors::PaymentError;
use crate::observability;

#[derive(Debug, Clone)]
struct CachedCredential {
    secret: String,
    expires_at: Instant,
}

impl CachedCredential {
    fn is_valid(&self) -> bool {
        self.expires_at > Instant::now()
    }
}

/// Per-provider-key cache of ephemeral credentials.
pub struct CredentialCache {
    entries: DashMap<String, CachedCredential>,
    refresh_locks: DashMap<String, Arc<Mutex<()>>>,
    default_ttl: Duration,
}

impl CredentialCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            refresh_locks: DashMap::new(),
            default_ttl,
        }
    }

    /// Return a currently valid credential for `key`, issuing a new one only
    /// when the cached entry is absent or expired.
    pub async fn get(
        &self,
        key: &str,
        issuer: &dyn CredentialIssuer,
    ) -> Result<String, PaymentError> {
        if let Some(secret) = self.lookup(key) {
            observability::record_credential_cache("hit");
            return Ok(secret);
        }

        self.refresh(key, issuer).await
    }

    /// Drop the cached entry for `key` unconditionally, forcing the next
    /// `get` to re-issue. Used when a downstream call rejected the
    /// credential before its TTL ran out.
    pub fn invalidate(&self, key: &str) {
        if self.entries.remove(key).is_some() {
            debug!(key, "credential invalidated");
            observability::record_credential_cache("invalidate");
        }
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_valid())
            .map(|entry| entry.secret.clone())
    }

    async fn refresh(
        &self,
        key: &str,
        issuer: &dyn CredentialIssuer,
    ) -> Result<String, PaymentError> {
        let lock = self
            .refresh_locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another caller may have finished refreshing while we waited.
        if let Some(secret) = self.lookup(key) {
            observability::record_credential_cache("hit");
            return Ok(secret);
        }

        observability::record_credential_cache("miss");
        let issued = issuer.issue(key).await?;

        let ttl = issued.ttl.unwrap_or(self.default_ttl);
        self.entries.insert(
            key.to_string(),
            CachedCredential {
                secret: issued.secret.clone(),
                expires_at: Instant::now() + ttl,
            },
        );

        debug!(key, ttl_secs = ttl.as_secs(), "credential refreshed");
        observability::record_credential_cache("refresh");

        Ok(issued.secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::IssuedCredential;
    use crate::errors::ErrorKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingIssuer {
        calls: AtomicU32,
        ttl: Option<Duration>,
        fail: bool,
    }

    impl CountingIssuer {
        fn new(ttl: Option<Duration>) -> Self {
            Self {
                calls: AtomicU32::new(0),
                ttl,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicU32::new(0),
                ttl: None,
                fail: true,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialIssuer for CountingIssuer {
        async fn issue(&self, key: &str) -> Result<IssuedCredential, PaymentError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            // Widen the race window so overlapping callers actually overlap.
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail {
                return Err(PaymentError::new(
                    ErrorKind::AuthenticationFailed,
                    "issuer rejected",
                ));
            }
            Ok(IssuedCredential {
                secret: format!("{key}-secret-{n}"),
                ttl: self.ttl,
            })
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_issuer() {
        let cache = CredentialCache::new(Duration::from_secs(60));
        let issuer = CountingIssuer::new(None);

        let first = cache.get("acct", &issuer).await.unwrap();
        let second = cache.get("acct", &issuer).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(issuer.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_gets_issue_once() {
        let cache = Arc::new(CredentialCache::new(Duration::from_secs(60)));
        let issuer = Arc::new(CountingIssuer::new(None));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = Arc::clone(&cache);
            let issuer = Arc::clone(&issuer);
            handles.push(tokio::spawn(async move {
                cache.get("acct", issuer.as_ref()).await.unwrap()
            }));
        }

        let mut secrets = Vec::new();
        for handle in handles {
            secrets.push(handle.await.unwrap());
        }

        assert_eq!(issuer.calls(), 1, "duplicate issuance race");
        assert!(secrets.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_expired_entry_never_returned() {
        let cache = CredentialCache::new(Duration::from_millis(10));
        let issuer = CountingIssuer::new(None);

        let first = cache.get("acct", &issuer).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        let second = cache.get("acct", &issuer).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(issuer.calls(), 2);
    }

    #[tokio::test]
    async fn test_provider_ttl_overrides_default() {
        let cache = CredentialCache::new(Duration::from_millis(1));
        let issuer = CountingIssuer::new(Some(Duration::from_secs(60)));

        cache.get("acct", &issuer).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        cache.get("acct", &issuer).await.unwrap();

        assert_eq!(issuer.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reissue() {
        let cache = CredentialCache::new(Duration::from_secs(60));
        let issuer = CountingIssuer::new(None);

        cache.get("acct", &issuer).await.unwrap();
        cache.invalidate("acct");
        cache.get("acct", &issuer).await.unwrap();

        assert_eq!(issuer.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_unknown_key_is_noop() {
        let cache = CredentialCache::new(Duration::from_secs(60));
        cache.invalidate("never-seen");
    }

    #[tokio::test]
    async fn test_failure_caches_nothing() {
        let cache = CredentialCache::new(Duration::from_secs(60));
        let failing = CountingIssuer::failing();

        assert!(cache.get("acct", &failing).await.is_err());
        assert!(cache.get("acct", &failing).await.is_err());
        assert_eq!(failing.calls(), 2);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_contend() {
        let cache = Arc::new(CredentialCache::new(Duration::from_secs(60)));
        let issuer = Arc::new(CountingIssuer::new(None));

        let mut handles = Vec::new();
        for key in ["a", "b", "c", "d"] {
            let cache = Arc::clone(&cache);
            let issuer = Arc::clone(&issuer);
            handles.push(tokio::spawn(async move {
                cache.get(key, issuer.as_ref()).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(issuer.calls(), 4);
    }
}
