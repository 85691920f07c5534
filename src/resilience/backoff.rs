//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Delay before the retry following `attempt` (1-indexed).
///
/// The pre-jitter delay is `initial * multiplier^(attempt-1)`, capped at the
/// configured maximum. With jitter enabled the realized delay is drawn from
/// `[delay/2, delay]` to spread out synchronized retriers.
pub fn backoff_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let exponent = attempt.saturating_sub(1);
    let raw_ms = (config.initial_delay_ms as f64) * config.multiplier.powi(exponent as i32);
    let capped_ms = raw_ms.min(config.max_delay_ms as f64) as u64;

    if !config.enable_jitter || capped_ms == 0 {
        return Duration::from_millis(capped_ms);
    }

    let half = capped_ms / 2;
    let jitter = rand::thread_rng().gen_range(0..=half);
    Duration::from_millis(half + jitter)
}
