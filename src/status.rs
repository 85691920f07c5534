//! Payment status state machine and per-transaction event log.
//!
//! # Design Decisions
//! - `Pending` is the only initial state; the four other states are terminal
//! - A terminal transaction never changes status again; late notifications
//!   are still appended to the event log for audit
//! - The event log is append-only, oldest first; the tail always matches the
//!   current status while the transaction is live

use std::collections::HashMap;
use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Cancelled,
    Expired,
}

impl PaymentStatus {
    pub fn is_successful(&self) -> bool {
        matches!(self, PaymentStatus::Success)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PaymentStatus::Failed)
    }

    /// A completed status is terminal; no further transitions are accepted.
    pub fn is_completed(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// One immutable record in a transaction's status history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: PaymentStatus,
    pub timestamp: SystemTime,
    pub message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

/// Current status of one transaction plus its append-only event history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatus {
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_reference: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub last_updated: SystemTime,
    #[serde(default)]
    pub events: Vec<StatusEvent>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub provider_data: HashMap<String, Value>,
}

impl TransactionStatus {
    /// Create a pending status for a fresh transaction.
    pub fn pending(transaction_id: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            status: PaymentStatus::Pending,
            reference: reference.into(),
            provider_reference: None,
            message: String::new(),
            last_updated: SystemTime::now(),
            events: Vec::new(),
            provider_data: HashMap::new(),
        }
    }

    /// Append a status event and advance the current status.
    ///
    /// Once a terminal status is reached the event is still recorded for
    /// audit, but the transaction's status does not regress or change.
    pub fn add_event(&mut self, status: PaymentStatus, message: impl Into<String>) {
        let event = StatusEvent {
            status,
            timestamp: SystemTime::now(),
            message: message.into(),
            metadata: HashMap::new(),
        };
        self.last_updated = event.timestamp;
        self.events.push(event);
        if !self.status.is_completed() {
            self.status = status;
        }
    }

    /// Most recent status event, if any.
    pub fn latest_event(&self) -> Option<&StatusEvent> {
        self.events.last()
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    pub fn is_successful(&self) -> bool {
        self.status.is_successful()
    }
}
