//! Payment submission and status checks for the PIN gateway.

use std::time::SystemTime;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::errors::{ErrorKind, PaymentError};
use crate::payment::{PaymentRequest, PaymentResponse};
use crate::providers::pinpay::models::{
    result_code_to_status, transaction_state_to_status, StatusCheckRequest, StatusCheckResponse,
    SubmitRequest, SubmitResponse,
};
use crate::providers::pinpay::{passcode, PinPayProvider, PROVIDER_NAME};
use crate::resilience::{AttemptOutcome, FailedAttempt};
use crate::status::TransactionStatus;
use crate::transport::{TransportError, TransportRequest};

impl PinPayProvider {
    pub(super) async fn submit_payment(
        &self,
        request: &PaymentRequest,
    ) -> AttemptOutcome<PaymentResponse> {
        let token = self.bearer_token().await?;

        // Always a fresh server-generated code; caller-supplied codes are
        // never transmitted.
        let passcode = passcode::generate();
        debug!(
            operation_id = %request.reference,
            passcode,
            "generated payment passcode"
        );

        let submit = SubmitRequest {
            client_phone: request.phone_number.for_provider(false),
            passcode: passcode.clone(),
            operation_id: request.reference.clone(),
            amount: request.amount.to_provider_amount(false),
            language: request.language.code().to_string(),
        };

        let payload = serde_json::to_vec(&submit).map_err(|e| {
            PaymentError::new(ErrorKind::InvalidRequest, "failed to encode payment request")
                .with_provider(PROVIDER_NAME)
                .with_source(e)
        })?;

        let http_request = TransportRequest::post(
            format!("{}/payment", self.base_url),
            payload,
            self.config.timeout(),
        )
        .with_header("Content-Type", "application/json")
        .with_header("Authorization", format!("Bearer {token}"));

        info!(
            operation_id = %request.reference,
            amount = %request.amount,
            "submitting payment"
        );

        let response = self
            .transport
            .send(http_request)
            .await
            .map_err(|e| transport_error("payment request failed", e))?;

        if !response.is_success() {
            return Err(FailedAttempt::new(
                PaymentError::new(
                    ErrorKind::ProviderError,
                    format!("payment endpoint returned status {}", response.status),
                )
                .with_provider(PROVIDER_NAME)
                .with_detail("status", json!(response.status)),
            ));
        }

        let submit_response: SubmitResponse =
            serde_json::from_slice(&response.body).map_err(|e| {
                PaymentError::new(ErrorKind::ProviderError, "failed to decode payment response")
                    .with_provider(PROVIDER_NAME)
                    .with_retryable(false)
                    .with_source(e)
            })?;

        let status = result_code_to_status(&submit_response.error_code);
        let now = SystemTime::now();

        let mut metadata = std::collections::HashMap::new();
        metadata.insert("error_code".into(), json!(submit_response.error_code));
        metadata.insert("error_message".into(), json!(submit_response.error_message));
        metadata.insert(
            "provider_reference".into(),
            json!(submit_response.transaction_id),
        );
        // The payer needs the code to confirm on their handset.
        metadata.insert("passcode".into(), json!(passcode));

        let canonical = PaymentResponse {
            transaction_id: submit_response.transaction_id,
            status,
            amount: request.amount,
            reference: request.reference.clone(),
            provider: PROVIDER_NAME.to_string(),
            created_at: now,
            updated_at: now,
            payment_url: None,
            metadata,
        };

        info!(
            transaction_id = %canonical.transaction_id,
            status = %canonical.status,
            "payment response received"
        );

        Ok(canonical)
    }

    pub(super) async fn check_status(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionStatus, PaymentError> {
        let token = self.bearer_token().await.map_err(|failed| failed.error)?;

        let check = StatusCheckRequest {
            operation_id: transaction_id.to_string(),
        };
        let payload = serde_json::to_vec(&check).map_err(|e| {
            PaymentError::new(ErrorKind::InvalidRequest, "failed to encode status check")
                .with_provider(PROVIDER_NAME)
                .with_source(e)
        })?;

        let http_request = TransportRequest::post(
            format!("{}/checkTransaction", self.base_url),
            payload,
            self.config.timeout(),
        )
        .with_header("Content-Type", "application/json")
        .with_header("Authorization", format!("Bearer {token}"));

        let response = self
            .transport
            .send(http_request)
            .await
            .map_err(|e| transport_error("status check failed", e).error)?;

        if !response.is_success() {
            return Err(PaymentError::new(
                ErrorKind::ProviderError,
                format!("status endpoint returned status {}", response.status),
            )
            .with_provider(PROVIDER_NAME));
        }

        let check_response: StatusCheckResponse =
            serde_json::from_slice(&response.body).map_err(|e| {
                PaymentError::new(ErrorKind::ProviderError, "failed to decode status response")
                    .with_provider(PROVIDER_NAME)
                    .with_retryable(false)
                    .with_source(e)
            })?;

        let mut status = TransactionStatus::pending(
            check_response.transaction_id.clone(),
            transaction_id.to_string(),
        );
        status.status = transaction_state_to_status(&check_response.status);
        status.provider_reference = Some(check_response.transaction_id.clone());
        status.message = check_response.error_message.clone();
        status.provider_data = provider_data(&check_response);

        Ok(status)
    }

    pub(super) async fn bearer_token(&self) -> Result<String, FailedAttempt<PaymentResponse>> {
        self.credentials
            .get(&self.account_key, &self.issuer)
            .await
            .map_err(FailedAttempt::new)
    }
}

fn transport_error(message: &str, err: TransportError) -> FailedAttempt<PaymentResponse> {
    let kind = match err {
        TransportError::Timeout => ErrorKind::Timeout,
        _ => ErrorKind::NetworkError,
    };
    FailedAttempt::new(
        PaymentError::new(kind, message)
            .with_provider(PROVIDER_NAME)
            .with_source(err),
    )
}

fn provider_data(response: &StatusCheckResponse) -> std::collections::HashMap<String, Value> {
    let mut data = std::collections::HashMap::new();
    data.insert("error_code".into(), json!(response.error_code));
    data.insert("error_message".into(), json!(response.error_message));
    data.insert("status".into(), json!(response.status));
    data.insert("transaction_id".into(), json!(response.transaction_id));
    data
}
