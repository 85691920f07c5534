//! Payment provider adapters.
//!
//! # Data Flow
//! ```text
//! dispatcher → PaymentProvider::process_payment
//!     → CredentialCache::get (issuer call on miss)
//!     → Transport::send (provider wire call)
//!     → provider outcome mapped to canonical response/error
//! ```
//!
//! # Design Decisions
//! - Two protocol variants behind one trait; callers branch on the
//!   `ProviderKind` capability flags, never on concrete types
//! - Each `process_payment` call is safe to repeat: providers key external
//!   transactions on the caller-supplied reference
//! - Adapters raise the most specific canonical kind available and decide
//!   retryability at the raise site

pub mod pinpay;
pub mod webpay;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorKind, PaymentError};
use crate::payment::{PaymentRequest, PaymentResponse};
use crate::resilience::AttemptOutcome;
use crate::status::TransactionStatus;

pub use pinpay::PinPayProvider;
pub use webpay::WebPayProvider;

/// Protocol variant of a provider, with explicit capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Synchronous flow: bearer credential, server-generated PIN, immediate
    /// result code.
    PinDirect,
    /// Asynchronous flow: merchant session, payer redirect, webhook
    /// settlement.
    WebSession,
}

impl ProviderKind {
    /// Whether the provider exposes an explicit status-check call.
    pub fn supports_status_polling(&self) -> bool {
        matches!(self, ProviderKind::PinDirect)
    }

    /// Whether settlement arrives via webhook notifications.
    pub fn supports_webhook_notifications(&self) -> bool {
        matches!(self, ProviderKind::WebSession)
    }
}

/// Webhook notification payload delivered by a session-style gateway. The
/// HTTP endpoint receiving it is the embedding application's concern; this
/// crate only interprets the payload. Serde names follow the gateway's
/// abbreviated wire vocabulary; every field defaults so a sparse payload
/// still parses and fails semantic validation instead.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NotificationData {
    /// Gateway status token (`"Ok"` affirmative, `"NOK"` negative).
    pub status: String,
    #[serde(rename = "clientid")]
    pub client_id: String,
    #[serde(rename = "cname")]
    pub client_name: String,
    pub mobile: String,
    /// Caller-supplied idempotency reference echoed back.
    #[serde(rename = "purchaseref")]
    pub purchase_ref: String,
    #[serde(rename = "paymentref")]
    pub payment_ref: String,
    #[serde(rename = "payid")]
    pub pay_id: String,
    pub timestamp: String,
    #[serde(rename = "ipaddr")]
    pub ip_address: String,
    pub error: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Common contract implemented by every provider adapter.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    /// Whether the provider can currently take payments (in practice:
    /// whether a credential can be obtained).
    async fn is_available(&self) -> bool;

    /// Execute one payment attempt. The dispatcher drives this through the
    /// retry executor, so a single call must not duplicate side effects on
    /// repeat.
    async fn process_payment(&self, request: &PaymentRequest) -> AttemptOutcome<PaymentResponse>;

    /// Explicit status check, where the protocol supports polling.
    async fn get_status(&self, transaction_id: &str) -> Result<TransactionStatus, PaymentError>;

    /// Interpret a webhook notification, where the protocol settles
    /// asynchronously.
    async fn handle_notification(
        &self,
        _notification: &NotificationData,
    ) -> Result<TransactionStatus, PaymentError> {
        Err(PaymentError::new(
            ErrorKind::InvalidRequest,
            format!("provider {} does not accept webhook notifications", self.name()),
        )
        .with_provider(self.name().to_string()))
    }

    /// Re-check the adapter's configuration. Pure: repeated calls with
    /// unchanged configuration return the same result.
    fn validate_config(&self) -> Result<(), PaymentError>;

    /// Drop any cached credential so the next call re-issues. Called by the
    /// dispatcher when a credential was rejected downstream.
    fn invalidate_credentials(&self);
}

impl std::fmt::Debug for dyn PaymentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentProvider")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_parses_gateway_wire_names() {
        let payload = r#"{
            "status": "Ok",
            "clientid": "C-1",
            "cname": "A. Payer",
            "mobile": "31234567",
            "purchaseref": "REF-9",
            "paymentref": "PAY-77",
            "payid": "ID-1",
            "timestamp": "2026-08-31T10:00:00Z",
            "ipaddr": "10.0.0.1"
        }"#;

        let n: NotificationData = serde_json::from_str(payload).unwrap();
        assert_eq!(n.status, "Ok");
        assert_eq!(n.client_id, "C-1");
        assert_eq!(n.client_name, "A. Payer");
        assert_eq!(n.purchase_ref, "REF-9");
        assert_eq!(n.payment_ref, "PAY-77");
        assert_eq!(n.pay_id, "ID-1");
        assert_eq!(n.ip_address, "10.0.0.1");
        assert!(n.error.is_empty());
    }

    #[test]
    fn test_sparse_notification_still_parses() {
        // Semantic checks (e.g. a missing purchase reference) belong to the
        // provider handler, not the decoder.
        let n: NotificationData = serde_json::from_str(r#"{"status":"NOK"}"#).unwrap();
        assert_eq!(n.status, "NOK");
        assert!(n.purchase_ref.is_empty());
    }

    #[test]
    fn test_unknown_notification_fields_preserved() {
        let n: NotificationData =
            serde_json::from_str(r#"{"status":"Ok","purchaseref":"REF-1","channel":"ussd"}"#)
                .unwrap();
        assert_eq!(n.extra.get("channel").unwrap(), "ussd");
    }

    #[test]
    fn test_notification_serializes_wire_names() {
        let n = NotificationData {
            status: "Ok".into(),
            purchase_ref: "REF-1".into(),
            pay_id: "ID-1".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["purchaseref"], "REF-1");
        assert_eq!(value["payid"], "ID-1");
        assert!(value.get("purchase_ref").is_none());
    }
}
