//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher → RetryExecutor::execute(cancel, operation)
//!     → operation() (one provider call)
//!     → on retryable failure: backoff.rs computes the delay, sleep
//!     → cancellation observed before each attempt and during the sleep
//! ```
//!
//! # Design Decisions
//! - The executor performs no I/O and holds no per-call state
//! - Retryability is read off the error; kinds are never reinterpreted
//! - One executor instance per response shape, no type erasure

pub mod backoff;
pub mod executor;

pub use backoff::backoff_delay;
pub use executor::{AttemptOutcome, FailedAttempt, RetryExecutor};
