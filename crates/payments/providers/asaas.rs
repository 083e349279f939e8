use serde_json::Value;

use super::{ProviderAdapter, optional_str, optional_timestamp, required_str};
use crate::domain::value_objects::{
    enums::{payment_providers::PaymentProvider, payment_statuses::PaymentStatus},
    payment_webhook::{NormalizeError, NormalizedEvent, PaymentUpdateCommand},
};

pub struct AsaasAdapter;

impl ProviderAdapter for AsaasAdapter {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Asaas
    }

    fn normalize(
        &self,
        event: &str,
        data: &Value,
        raw_payload: &Value,
    ) -> Result<NormalizedEvent, NormalizeError> {
        let (status, provider_payment_id, paid_at) = match event {
            "PAYMENT_RECEIVED" => (
                PaymentStatus::Paid,
                Some(required_str(data, "/id", "data.id")?),
                optional_timestamp(data, "/paymentDate", "data.paymentDate")?,
            ),
            "PAYMENT_OVERDUE" | "PAYMENT_DELETED" => {
                (PaymentStatus::Failed, optional_str(data, "/id"), None)
            }
            _ => {
                return Ok(NormalizedEvent::Unhandled {
                    provider: PaymentProvider::Asaas,
                    event: event.to_string(),
                });
            }
        };

        Ok(NormalizedEvent::Update(PaymentUpdateCommand {
            external_reference: required_str(data, "/externalReference", "data.externalReference")?,
            status,
            provider_payment_id,
            paid_at,
            raw_payload: raw_payload.clone(),
        }))
    }
}
