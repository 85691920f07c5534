//! Money value object.
//!
//! Amounts are fixed-point decimals rounded to two places; providers receive
//! either the decimal string or the minor-unit (cent) integer depending on
//! their wire conventions.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Supported settlement currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Mauritanian Ouguiya.
    MRU,
    /// Pre-2018 Ouguiya, kept for legacy reconciliation data.
    MRO,
}

impl Currency {
    /// ISO 4217 numeric code, used by form-based gateways.
    pub fn numeric_code(&self) -> &'static str {
        match self {
            Currency::MRU => "929",
            Currency::MRO => "478",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::MRU => f.write_str("MRU"),
            Currency::MRO => f.write_str("MRO"),
        }
    }
}

/// A currency-tagged fixed-point amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(2),
            currency,
        }
    }

    /// Build an amount from minor units (cents).
    pub fn from_minor_units(units: i64, currency: Currency) -> Self {
        Self::new(Decimal::new(units, 2), currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Amount in minor units (cents), saturating at the `i64` bounds for
    /// amounts too large to represent.
    pub fn minor_units(&self) -> i64 {
        self.amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .unwrap_or_else(|| {
                if self.amount.is_sign_negative() {
                    i64::MIN
                } else {
                    i64::MAX
                }
            })
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Format the amount for a provider wire call, either as minor units or
    /// as a two-place decimal string.
    pub fn to_provider_amount(&self, in_minor_units: bool) -> String {
        if in_minor_units {
            self.minor_units().to_string()
        } else {
            format!("{:.2}", self.amount)
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}
