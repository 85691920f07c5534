//! Phone number value object.
//!
//! Numbers are normalized to the eight-digit local subscriber form used by
//! both gateways; the +222 country prefix is stripped on parse and re-added
//! only for international display.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::PaymentError;

const COUNTRY_CODE: &str = "222";

/// A validated local subscriber number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    number: String,
}

impl Phone {
    /// Parse and normalize a phone number. Accepts local eight-digit form or
    /// the same with a `+222`, `00222` or `222` prefix; separators are
    /// ignored.
    pub fn parse(raw: &str) -> Result<Self, PaymentError> {
        if raw.trim().is_empty() {
            return Err(PaymentError::validation("phone_number", "is required"));
        }

        let cleaned: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
            .collect();

        let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PaymentError::validation(
                "phone_number",
                format!("contains non-digit characters: {raw}"),
            ));
        }

        // Local numbers never start with 0, so the 00222 prefix is
        // unambiguous; the bare 222 prefix is only a country code when it
        // leaves exactly eight digits (22234567 is a valid local number).
        let local = if let Some(rest) = digits.strip_prefix("00222") {
            rest
        } else if digits.len() == 11 {
            digits.strip_prefix(COUNTRY_CODE).unwrap_or(digits)
        } else {
            digits
        };

        if local.len() != 8 || !matches!(local.as_bytes()[0], b'2'..=b'9') {
            return Err(PaymentError::validation(
                "phone_number",
                format!("not a valid subscriber number: {raw}"),
            ));
        }

        Ok(Self {
            number: local.to_string(),
        })
    }

    /// Local eight-digit form, as submitted to providers.
    pub fn local_format(&self) -> &str {
        &self.number
    }

    /// International form with the country prefix.
    pub fn international_format(&self) -> String {
        format!("+{}{}", COUNTRY_CODE, self.number)
    }

    /// Wire form for a provider call, with or without the country code.
    pub fn for_provider(&self, include_country_code: bool) -> String {
        if include_country_code {
            format!("{}{}", COUNTRY_CODE, self.number)
        } else {
            self.number.clone()
        }
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.international_format())
    }
}
