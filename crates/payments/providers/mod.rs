//! Provider adapters turn each processor's webhook vocabulary into a
//! [`NormalizedEvent`]. Adapters are pure: they read the payload and never
//! touch storage.

pub mod asaas;
pub mod openpix;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::domain::value_objects::{
    enums::payment_providers::PaymentProvider,
    payment_webhook::{NormalizeError, NormalizedEvent},
};

use asaas::AsaasAdapter;
use openpix::OpenPixAdapter;

pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> PaymentProvider;

    /// `data` is the envelope's `data` object; `raw_payload` is the whole
    /// envelope and is carried into the update command untouched.
    fn normalize(
        &self,
        event: &str,
        data: &Value,
        raw_payload: &Value,
    ) -> Result<NormalizedEvent, NormalizeError>;
}

pub fn adapter_for(provider: PaymentProvider) -> &'static dyn ProviderAdapter {
    match provider {
        PaymentProvider::OpenPix => &OpenPixAdapter,
        PaymentProvider::Asaas => &AsaasAdapter,
    }
}

/// Reads a non-empty string (or number) at a JSON pointer.
pub(crate) fn optional_str(data: &Value, pointer: &str) -> Option<String> {
    match data.pointer(pointer)? {
        Value::String(value) if !value.trim().is_empty() => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

pub(crate) fn required_str(
    data: &Value,
    pointer: &str,
    field: &'static str,
) -> Result<String, NormalizeError> {
    optional_str(data, pointer).ok_or(NormalizeError::MissingField(field))
}

pub(crate) fn optional_timestamp(
    data: &Value,
    pointer: &str,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, NormalizeError> {
    match optional_str(data, pointer) {
        Some(raw) => parse_provider_timestamp(field, &raw).map(Some),
        None => Ok(None),
    }
}

/// Accepts RFC 3339, a zone-less date-time (read as UTC) or a bare date
/// (midnight UTC).
pub(crate) fn parse_provider_timestamp(
    field: &'static str,
    raw: &str,
) -> Result<DateTime<Utc>, NormalizeError> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed.and_utc());
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(NormalizeError::InvalidTimestamp {
        field,
        value: raw.to_string(),
    })
}
