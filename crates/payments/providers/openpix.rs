use serde_json::Value;

use super::{ProviderAdapter, optional_str, optional_timestamp, required_str};
use crate::domain::value_objects::{
    enums::{payment_providers::PaymentProvider, payment_statuses::PaymentStatus},
    payment_webhook::{NormalizeError, NormalizedEvent, PaymentUpdateCommand},
};

/// OpenPix namespaces its event names (`OPENPIX:CHARGE_COMPLETED`); the bare
/// name is accepted too.
const EVENT_NAMESPACE: &str = "OPENPIX:";

pub struct OpenPixAdapter;

impl ProviderAdapter for OpenPixAdapter {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::OpenPix
    }

    fn normalize(
        &self,
        event: &str,
        data: &Value,
        raw_payload: &Value,
    ) -> Result<NormalizedEvent, NormalizeError> {
        let event_name = event.strip_prefix(EVENT_NAMESPACE).unwrap_or(event);

        let command = match event_name {
            "CHARGE_COMPLETED" => PaymentUpdateCommand {
                external_reference: required_str(data, "/correlationID", "data.correlationID")?,
                status: PaymentStatus::Paid,
                provider_payment_id: Some(required_str(data, "/charge/id", "data.charge.id")?),
                paid_at: optional_timestamp(data, "/charge/paidAt", "data.charge.paidAt")?,
                raw_payload: raw_payload.clone(),
            },
            "CHARGE_EXPIRED" => PaymentUpdateCommand {
                external_reference: required_str(data, "/correlationID", "data.correlationID")?,
                status: PaymentStatus::Failed,
                provider_payment_id: optional_str(data, "/charge/id"),
                paid_at: None,
                raw_payload: raw_payload.clone(),
            },
            _ => {
                return Ok(NormalizedEvent::Unhandled {
                    provider: PaymentProvider::OpenPix,
                    event: event.to_string(),
                });
            }
        };

        Ok(NormalizedEvent::Update(command))
    }
}
