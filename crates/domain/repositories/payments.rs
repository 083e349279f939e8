use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::payments::{InsertPaymentEntity, PaymentEntity, PaymentStatusChangeset},
    value_objects::enums::payment_statuses::PaymentStatus,
};

#[async_trait]
#[automock]
pub trait PaymentRepository {
    async fn insert(&self, payment: InsertPaymentEntity) -> Result<PaymentEntity>;

    async fn find_by_id(&self, payment_id: String) -> Result<Option<PaymentEntity>>;

    /// Applies `changes` only while the stored status still equals `expected_status`.
    /// Returns `None` when the row is missing or its status has moved on.
    async fn update_status_if_current(
        &self,
        payment_id: String,
        expected_status: PaymentStatus,
        changes: PaymentStatusChangeset,
    ) -> Result<Option<PaymentEntity>>;

    async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<PaymentEntity>>;

    async fn list_by_company_between(
        &self,
        company_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PaymentEntity>>;
}
