use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::enums::{payment_providers::PaymentProvider, payment_statuses::PaymentStatus};

/// Body posted by a payment provider. `provider` stays a raw string so an
/// unknown provider can be told apart from malformed JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentWebhookEnvelope {
    pub provider: String,
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Provider-independent instruction for the payment store.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentUpdateCommand {
    pub external_reference: String,
    pub status: PaymentStatus,
    pub provider_payment_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    /// The full request envelope exactly as received.
    pub raw_payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedEvent {
    Update(PaymentUpdateCommand),
    /// A known provider sent an event this service does not act on.
    Unhandled {
        provider: PaymentProvider,
        event: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid timestamp in `{field}`: {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}
