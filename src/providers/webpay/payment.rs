//! Checkout initiation and webhook interpretation for the web gateway.

use std::collections::HashMap;
use std::time::SystemTime;

use serde_json::json;
use tracing::info;

use crate::errors::PaymentError;
use crate::payment::{PaymentRequest, PaymentResponse};
use crate::providers::webpay::models::{checkout_form, notification_token_to_status};
use crate::providers::webpay::{WebPayProvider, PROVIDER_NAME};
use crate::providers::NotificationData;
use crate::resilience::{AttemptOutcome, FailedAttempt};
use crate::status::{PaymentStatus, TransactionStatus};

impl WebPayProvider {
    /// No payment executes synchronously: the adapter hands back a pending
    /// response with the hosted checkout URL, and settlement arrives later
    /// through the webhook.
    pub(super) async fn initiate_checkout(
        &self,
        request: &PaymentRequest,
    ) -> AttemptOutcome<PaymentResponse> {
        let session_id = self
            .credentials
            .get(&self.merchant_id, &self.issuer)
            .await
            .map_err(FailedAttempt::new)?;

        let brand = self
            .config
            .options
            .get("brand_name")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let form = checkout_form(&session_id, &self.merchant_id, brand.as_deref(), request);
        let payment_url = format!("{}/online/online.php", self.base_url);

        info!(
            reference = %request.reference,
            session_id = %session_id,
            amount = %request.amount,
            "checkout initiated"
        );

        let now = SystemTime::now();
        let mut metadata = HashMap::new();
        metadata.insert("session_id".into(), json!(session_id));
        metadata.insert("form_data".into(), json!(form));
        metadata.insert("payment_url".into(), json!(payment_url));
        metadata.insert(
            "message".into(),
            json!("payment initiated, redirect payer to payment URL"),
        );

        Ok(PaymentResponse {
            // The provider assigns its own reference only at settlement;
            // until then the caller's reference identifies the transaction.
            transaction_id: request.reference.clone(),
            status: PaymentStatus::Pending,
            amount: request.amount,
            reference: request.reference.clone(),
            provider: PROVIDER_NAME.to_string(),
            created_at: now,
            updated_at: now,
            payment_url: Some(payment_url),
            metadata,
        })
    }

    /// Interpret a webhook notification. The webhook is authoritative for
    /// this gateway; there is no polling alternative.
    pub(super) fn apply_notification(
        &self,
        notification: &NotificationData,
    ) -> Result<TransactionStatus, PaymentError> {
        if notification.purchase_ref.is_empty() {
            return Err(PaymentError::validation("purchase_ref", "is required")
                .with_provider(PROVIDER_NAME));
        }

        let status = notification_token_to_status(&notification.status);
        let message = if status == PaymentStatus::Failed && !notification.error.is_empty() {
            notification.error.clone()
        } else {
            "payment notification received".to_string()
        };

        info!(
            reference = %notification.purchase_ref,
            status = %status,
            payment_ref = %notification.payment_ref,
            "notification processed"
        );

        let mut transaction = TransactionStatus::pending(
            notification.pay_id.clone(),
            notification.purchase_ref.clone(),
        );
        transaction.provider_reference = Some(notification.payment_ref.clone());
        transaction.provider_data = HashMap::from([
            ("client_id".to_string(), json!(notification.client_id)),
            ("client_name".to_string(), json!(notification.client_name)),
            ("mobile".to_string(), json!(notification.mobile)),
            ("payment_ref".to_string(), json!(notification.payment_ref)),
            ("pay_id".to_string(), json!(notification.pay_id)),
            ("timestamp".to_string(), json!(notification.timestamp)),
            ("ip_address".to_string(), json!(notification.ip_address)),
            ("status".to_string(), json!(notification.status)),
        ]);
        transaction.add_event(status, message);

        Ok(transaction)
    }
}
