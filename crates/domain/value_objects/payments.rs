use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::domain::{
    entities::payments::{InsertPaymentEntity, PaymentEntity},
    value_objects::enums::{
        payment_methods::PaymentMethod, payment_providers::PaymentProvider,
        payment_statuses::PaymentStatus,
    },
};

pub const DEFAULT_CURRENCY: &str = "BRL";

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePaymentModel {
    pub company_id: Uuid,
    pub plan_id: Uuid,
    /// Minor units (centavos for BRL).
    pub amount: i64,
    pub currency: Option<String>,
    pub method: PaymentMethod,
    pub provider: PaymentProvider,
    pub metadata: Option<serde_json::Value>,
}

impl CreatePaymentModel {
    pub fn to_entity(&self) -> InsertPaymentEntity {
        InsertPaymentEntity {
            id: Uuid::new_v4().to_string(),
            company_id: self.company_id,
            plan_id: self.plan_id,
            amount: self.amount,
            currency: self
                .currency
                .clone()
                .filter(|currency| !currency.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            status: PaymentStatus::Pending.to_string(),
            method: self.method.to_string(),
            provider: self.provider.to_string(),
            metadata: self
                .metadata
                .clone()
                .unwrap_or_else(|| serde_json::json!({})),
        }
    }
}

/// JSON shape of a payment row returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentDto {
    pub id: String,
    pub company_id: Uuid,
    pub plan_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub method: String,
    pub provider: String,
    pub provider_payment_id: Option<String>,
    #[serde(serialize_with = "serialize_optional_millis")]
    pub paid_at: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
    pub provider_data: Option<serde_json::Value>,
    #[serde(serialize_with = "serialize_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_millis")]
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentEntity> for PaymentDto {
    fn from(value: PaymentEntity) -> Self {
        Self {
            id: value.id,
            company_id: value.company_id,
            plan_id: value.plan_id,
            amount: value.amount,
            currency: value.currency,
            status: value.status,
            method: value.method,
            provider: value.provider,
            provider_payment_id: value.provider_payment_id,
            paid_at: value.paid_at,
            metadata: value.metadata,
            provider_data: value.provider_data,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// `2024-01-15T10:30:00.000Z`
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_millis<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(value))
}

fn serialize_optional_millis<S>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(value) => serializer.serialize_str(&format_timestamp(value)),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSummary {
    pub total_amount: i64,
    pub total_count: usize,
    pub paid_amount: i64,
    pub paid_count: usize,
    pub pending_amount: i64,
    pub pending_count: usize,
    pub failed_count: usize,
    #[serde(serialize_with = "serialize_millis")]
    pub period_start: DateTime<Utc>,
    #[serde(serialize_with = "serialize_millis")]
    pub period_end: DateTime<Utc>,
}

impl PaymentSummary {
    pub fn from_payments(
        payments: &[PaymentEntity],
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Self {
        let mut summary = Self {
            total_amount: 0,
            total_count: 0,
            paid_amount: 0,
            paid_count: 0,
            pending_amount: 0,
            pending_count: 0,
            failed_count: 0,
            period_start,
            period_end,
        };

        for payment in payments {
            summary.total_amount = summary.total_amount.saturating_add(payment.amount);
            summary.total_count += 1;

            match PaymentStatus::from_str(&payment.status) {
                Some(PaymentStatus::Paid) => {
                    summary.paid_amount = summary.paid_amount.saturating_add(payment.amount);
                    summary.paid_count += 1;
                }
                Some(PaymentStatus::Pending) => {
                    summary.pending_amount = summary.pending_amount.saturating_add(payment.amount);
                    summary.pending_count += 1;
                }
                Some(PaymentStatus::Failed) => summary.failed_count += 1,
                _ => {}
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn payment(status: PaymentStatus, amount: i64) -> PaymentEntity {
        let now = Utc::now();
        PaymentEntity {
            id: Uuid::new_v4().to_string(),
            company_id: Uuid::nil(),
            plan_id: Uuid::nil(),
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            status: status.to_string(),
            method: PaymentMethod::Pix.to_string(),
            provider: PaymentProvider::OpenPix.to_string(),
            provider_payment_id: None,
            paid_at: None,
            metadata: serde_json::json!({}),
            provider_data: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_model_defaults_to_pending_brl() {
        let model = CreatePaymentModel {
            company_id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            amount: 9900,
            currency: None,
            method: PaymentMethod::CreditCard,
            provider: PaymentProvider::Asaas,
            metadata: None,
        };

        let entity = model.to_entity();

        assert_eq!(entity.currency, "BRL");
        assert_eq!(entity.status, "pending");
        assert_eq!(entity.method, "credit_card");
        assert_eq!(entity.provider, "asaas");
        assert_eq!(entity.metadata, serde_json::json!({}));
        assert!(Uuid::parse_str(&entity.id).is_ok());
    }

    #[test]
    fn dto_renders_timestamps_with_milliseconds() {
        let mut entity = payment(PaymentStatus::Paid, 100);
        entity.paid_at = Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());

        let json = serde_json::to_value(PaymentDto::from(entity)).unwrap();

        assert_eq!(json["paid_at"], "2024-01-15T10:30:00.000Z");
        assert_eq!(json["status"], "paid");
    }

    #[test]
    fn dto_renders_missing_paid_at_as_null() {
        let json = serde_json::to_value(PaymentDto::from(payment(PaymentStatus::Pending, 1))).unwrap();

        assert!(json["paid_at"].is_null());
    }

    #[test]
    fn summary_buckets_by_status() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let payments = vec![
            payment(PaymentStatus::Paid, 1000),
            payment(PaymentStatus::Paid, 500),
            payment(PaymentStatus::Pending, 300),
            payment(PaymentStatus::Failed, 200),
            payment(PaymentStatus::Cancelled, 50),
        ];

        let summary = PaymentSummary::from_payments(&payments, start, end);

        assert_eq!(summary.total_amount, 2050);
        assert_eq!(summary.total_count, 5);
        assert_eq!(summary.paid_amount, 1500);
        assert_eq!(summary.paid_count, 2);
        assert_eq!(summary.pending_amount, 300);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.failed_count, 1);
    }

    #[test]
    fn summary_totals_saturate_instead_of_overflowing() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let payments = vec![
            payment(PaymentStatus::Paid, i64::MAX),
            payment(PaymentStatus::Paid, i64::MAX),
            payment(PaymentStatus::Pending, i64::MAX),
            payment(PaymentStatus::Pending, 1),
        ];

        let summary = PaymentSummary::from_payments(&payments, start, end);

        assert_eq!(summary.total_amount, i64::MAX);
        assert_eq!(summary.paid_amount, i64::MAX);
        assert_eq!(summary.paid_count, 2);
        assert_eq!(summary.pending_amount, i64::MAX);
        assert_eq!(summary.total_count, 4);
    }
}
