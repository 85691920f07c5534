//! Wire models and code tables for the synchronous PIN gateway.

use serde::{Deserialize, Serialize};

use crate::status::PaymentStatus;

/// Bearer grant response. The gateway also sends a refresh token; password
/// grants are cheap enough here that expiry always re-authenticates instead.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Lifetime in seconds, sent as a string by the gateway.
    #[serde(default)]
    pub expires_in: String,
}

/// Payment submission body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub client_phone: String,
    pub passcode: String,
    pub operation_id: String,
    pub amount: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,
}

/// Payment submission result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    #[serde(default)]
    pub error_code: String,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub transaction_id: String,
}

/// Status check body, keyed by the submit call's operation id.
#[derive(Debug, Clone, Serialize)]
pub struct StatusCheckRequest {
    #[serde(rename = "operationID")]
    pub operation_id: String,
}

/// Status check result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCheckResponse {
    #[serde(default)]
    pub error_code: String,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub status: String,
}

/// Map the gateway's documented numeric result codes onto the canonical
/// status. `0` is success; `1`, `2` (invalid token) and `4` (missing
/// operation id) are failures; anything undocumented stays pending.
pub fn result_code_to_status(code: &str) -> PaymentStatus {
    match code {
        "0" => PaymentStatus::Success,
        "1" | "2" | "4" => PaymentStatus::Failed,
        _ => PaymentStatus::Pending,
    }
}

/// Map the gateway's status enum (`TS` settled, `TF` failed, `TA` in
/// progress) onto the canonical status.
pub fn transaction_state_to_status(state: &str) -> PaymentStatus {
    match state {
        "TS" => PaymentStatus::Success,
        "TF" => PaymentStatus::Failed,
        "TA" => PaymentStatus::Pending,
        _ => PaymentStatus::Pending,
    }
}
