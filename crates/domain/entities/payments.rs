use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::payment_statuses::PaymentStatus,
    infra::db::postgres::schema::payments,
};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
    pub id: String,
    pub company_id: Uuid,
    pub plan_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub method: String,
    pub provider: String,
    pub provider_payment_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
    pub provider_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentEntity {
    pub fn payment_status(&self) -> Result<PaymentStatus> {
        PaymentStatus::from_str(&self.status).ok_or_else(|| {
            anyhow!(
                "payment {} has unknown status '{}'",
                self.id,
                self.status
            )
        })
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub id: String,
    pub company_id: Uuid,
    pub plan_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub method: String,
    pub provider: String,
    pub metadata: serde_json::Value,
}

/// Columns rewritten by a status change. `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = payments)]
pub struct PaymentStatusChangeset {
    pub status: String,
    pub provider_payment_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
    pub provider_data: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}
