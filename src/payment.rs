//! Canonical payment request and response types.

use std::collections::HashMap;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::PaymentError;
use crate::money::Money;
use crate::phone::Phone;
use crate::status::PaymentStatus;

/// Languages accepted by provider-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    English,
    #[default]
    French,
    Arabic,
}

impl Language {
    /// Two-letter code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "EN",
            Language::French => "FR",
            Language::Arabic => "AR",
        }
    }
}

/// Provider-agnostic payment request. Constructed once, then read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: Money,
    pub phone_number: Phone,
    /// Caller-supplied idempotency reference, unique per caller.
    pub reference: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<SystemTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
    /// Provider-specific fields carried opaquely.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl PaymentRequest {
    pub fn new(amount: Money, phone_number: Phone, reference: impl Into<String>) -> Self {
        Self {
            amount,
            phone_number,
            reference: reference.into(),
            description: String::new(),
            language: Language::default(),
            expires_at: None,
            success_url: None,
            failure_url: None,
            cancel_url: None,
            metadata: HashMap::new(),
        }
    }

    /// Structural validation: amount positivity, reference length and
    /// charset, destination presence. Deeper value validation is the job of
    /// the `Money`/`Phone` constructors.
    pub fn validate(&self) -> Result<(), PaymentError> {
        if !self.amount.is_positive() {
            return Err(PaymentError::validation("amount", "must be positive"));
        }

        if self.reference.is_empty() {
            return Err(PaymentError::validation("reference", "is required"));
        }

        if self.reference.len() > 50 {
            return Err(PaymentError::validation(
                "reference",
                "too long (max 50 characters)",
            ));
        }

        if !self
            .reference
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(PaymentError::validation("reference", "invalid format"));
        }

        Ok(())
    }

    /// Whether the caller-side expiry deadline has passed.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(deadline) => SystemTime::now() > deadline,
            None => false,
        }
    }
}

/// Provider-agnostic payment response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub amount: Money,
    pub reference: String,
    pub provider: String,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
    /// Redirect URL for out-of-band completion, when the provider uses one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl PaymentResponse {
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    pub fn is_successful(&self) -> bool {
        self.status.is_successful()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;
    use std::time::Duration;

    fn request(reference: &str, minor_units: i64) -> PaymentRequest {
        PaymentRequest::new(
            Money::from_minor_units(minor_units, Currency::MRU),
            Phone::parse("31234567").unwrap(),
            reference,
        )
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        assert!(request("PAY-2024_001", 1000).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_amount() {
        assert!(request("ref", 0).validate().is_err());
        assert!(request("ref", -500).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_reference() {
        assert!(request("", 1000).validate().is_err());
        assert!(request(&"x".repeat(51), 1000).validate().is_err());
        assert!(request("bad ref!", 1000).validate().is_err());
    }

    #[test]
    fn test_expiry_check() {
        let mut req = request("ref", 1000);
        assert!(!req.is_expired());

        req.expires_at = Some(SystemTime::now() - Duration::from_secs(60));
        assert!(req.is_expired());

        req.expires_at = Some(SystemTime::now() + Duration::from_secs(60));
        assert!(!req.is_expired());
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::English.code(), "EN");
        assert_eq!(Language::French.code(), "FR");
        assert_eq!(Language::Arabic.code(), "AR");
        assert_eq!(Language::default().code(), "FR");
    }
}
