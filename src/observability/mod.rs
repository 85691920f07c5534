//! Metrics facade helpers.
//!
//! # Metrics
//! - `payrail_credential_cache_total` (counter): hit/miss/refresh/invalidate
//! - `payrail_retry_attempts_total` (counter): attempts by provider
//! - `payrail_payments_total` (counter): dispatched payments by provider and
//!   terminal outcome
//!
//! The crate only emits through the `metrics` facade; installing a recorder
//! (and an exporter) is the embedding application's decision.

use metrics::counter;

pub fn record_credential_cache(outcome: &'static str) {
    counter!("payrail_credential_cache_total", "outcome" => outcome).increment(1);
}

pub fn record_retry_attempt(provider: &str) {
    counter!("payrail_retry_attempts_total", "provider" => provider.to_string()).increment(1);
}

pub fn record_payment(provider: &str, outcome: &'static str) {
    counter!(
        "payrail_payments_total",
        "provider" => provider.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
