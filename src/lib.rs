//! Multi-Provider Payment Execution Client
//!
//! A client library for executing mobile-money payments against multiple
//! provider gateways behind one canonical API, built on Tokio and reqwest.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                     DISPATCHER                       │
//!                  │                                                      │
//!   PaymentRequest │  ┌──────────┐   ┌──────────┐   ┌───────────────┐    │
//!   ───────────────┼─▶│ validate │──▶│ registry │──▶│ retry executor │    │
//!                  │  │ + expiry │   │  select  │   │ backoff+cancel │    │
//!                  │  └──────────┘   └──────────┘   └───────┬───────┘    │
//!                  │                                        │            │
//!                  │                                        ▼            │
//!                  │                      ┌──────────────────────────┐   │
//!                  │                      │    provider adapter      │   │
//!                  │                      │  pinpay  │    webpay     │   │
//!                  │                      │ PIN+poll │ session+hook  │   │
//!                  │                      └─────┬────────────┬───────┘   │
//!                  │                            │            │           │
//!                  │                   ┌────────▼──┐  ┌──────▼──────┐    │
//!                  │                   │credential │  │  transport  │    │
//!   PaymentResponse│                   │   cache   │  │  (reqwest)  │────┼──▶ Gateway
//!   ◀──────────────┼───────────────────┴───────────┴──┴─────────────┘    │
//!                  │                                                      │
//!                  │  ┌────────────────────────────────────────────────┐ │
//!                  │  │            Cross-Cutting Concerns               │ │
//!                  │  │  ┌────────┐ ┌────────┐ ┌──────────┐ ┌────────┐ │ │
//!                  │  │  │ config │ │ errors │ │observa-  │ │ status │ │ │
//!                  │  │  │        │ │        │ │ bility   │ │ model  │ │ │
//!                  │  │  └────────┘ └────────┘ └──────────┘ └────────┘ │ │
//!                  │  └────────────────────────────────────────────────┘ │
//!                  └──────────────────────────────────────────────────────┘
//! ```
//!
//! Two provider protocols are supported behind the same trait: a synchronous
//! PIN flow (bearer credential, server-generated passcode, immediate result
//! code, status polling) and a web-session flow (merchant session, hosted
//! redirect page, webhook settlement). Callers branch on `ProviderKind`
//! capability flags, never on concrete adapter types.

// Core value types
pub mod errors;
pub mod money;
pub mod payment;
pub mod phone;
pub mod status;

// Execution engine
pub mod credentials;
pub mod dispatcher;
pub mod providers;
pub mod registry;
pub mod resilience;
pub mod transport;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use config::{load_config, ClientConfig, ProviderConfig, RetryConfig};
pub use dispatcher::Dispatcher;
pub use errors::{ErrorKind, PaymentError};
pub use money::{Currency, Money};
pub use payment::{Language, PaymentRequest, PaymentResponse};
pub use phone::Phone;
pub use providers::{NotificationData, PaymentProvider, ProviderKind};
pub use registry::ProviderRegistry;
pub use status::{PaymentStatus, StatusEvent, TransactionStatus};
