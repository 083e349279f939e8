use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Cancelled,
    Refunded,
}

/// Result of asking whether a payment may move from one status to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    Allowed,
    /// The payment is already in the requested status; re-applying is a no-op.
    AlreadyApplied,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            "cancelled" => Some(PaymentStatus::Cancelled),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    /// Permitted moves:
    ///
    /// ```text
    /// pending -> paid
    /// pending -> failed
    /// failed  -> paid
    /// paid    -> refunded
    /// *       -> cancelled
    /// ```
    pub fn check_transition(self, next: PaymentStatus) -> StatusTransition {
        if self == next {
            return StatusTransition::AlreadyApplied;
        }

        match (self, next) {
            (PaymentStatus::Pending, PaymentStatus::Paid)
            | (PaymentStatus::Pending, PaymentStatus::Failed)
            | (PaymentStatus::Failed, PaymentStatus::Paid)
            | (PaymentStatus::Paid, PaymentStatus::Refunded)
            | (_, PaymentStatus::Cancelled) => StatusTransition::Allowed,
            _ => StatusTransition::Rejected,
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
