use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use crates::domain::{
    entities::{
        companies::CompanyEntity,
        payments::{InsertPaymentEntity, PaymentEntity, PaymentStatusChangeset},
    },
    repositories::{companies::CompanyRepository, payments::PaymentRepository},
    value_objects::enums::payment_statuses::PaymentStatus,
};
use crates::observability::alerts::{AlertSink, PlanActivationAlert};
use serde_json::json;
use uuid::Uuid;

pub(crate) const COMPANY_ID: Uuid = Uuid::from_u128(0x1111);
pub(crate) const PLAN_ID: Uuid = Uuid::from_u128(0x2222);

pub(crate) fn sample_payment(id: &str, status: PaymentStatus) -> PaymentEntity {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();

    PaymentEntity {
        id: id.to_string(),
        company_id: COMPANY_ID,
        plan_id: PLAN_ID,
        amount: 9900,
        currency: "BRL".to_string(),
        status: status.to_string(),
        method: "pix".to_string(),
        provider: "openpix".to_string(),
        provider_payment_id: None,
        paid_at: None,
        metadata: json!({}),
        provider_data: None,
        created_at,
        updated_at: created_at,
    }
}

/// Payment store with the same guarded-update semantics as the Postgres
/// repository.
#[derive(Default)]
pub(crate) struct InMemoryPaymentRepository {
    rows: Mutex<HashMap<String, PaymentEntity>>,
    /// Status forced onto the row right before the next guarded update.
    interference: Mutex<Option<PaymentStatus>>,
    update_calls: AtomicUsize,
}

impl InMemoryPaymentRepository {
    pub(crate) fn with(payments: Vec<PaymentEntity>) -> Self {
        let repo = Self::default();
        {
            let mut rows = repo.rows.lock().unwrap();
            for payment in payments {
                rows.insert(payment.id.clone(), payment);
            }
        }
        repo
    }

    pub(crate) fn get(&self, id: &str) -> Option<PaymentEntity> {
        self.rows.lock().unwrap().get(id).cloned()
    }

    pub(crate) fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn interfere_with_next_update(&self, status: PaymentStatus) {
        *self.interference.lock().unwrap() = Some(status);
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn insert(&self, payment: InsertPaymentEntity) -> Result<PaymentEntity> {
        let now = Utc::now();
        let entity = PaymentEntity {
            id: payment.id,
            company_id: payment.company_id,
            plan_id: payment.plan_id,
            amount: payment.amount,
            currency: payment.currency,
            status: payment.status,
            method: payment.method,
            provider: payment.provider,
            provider_payment_id: None,
            paid_at: None,
            metadata: payment.metadata,
            provider_data: None,
            created_at: now,
            updated_at: now,
        };

        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&entity.id) {
            return Err(anyhow!("duplicate payment id {}", entity.id));
        }
        rows.insert(entity.id.clone(), entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, payment_id: String) -> Result<Option<PaymentEntity>> {
        Ok(self.get(&payment_id))
    }

    async fn update_status_if_current(
        &self,
        payment_id: String,
        expected_status: PaymentStatus,
        changes: PaymentStatusChangeset,
    ) -> Result<Option<PaymentEntity>> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();

        let Some(row) = rows.get_mut(&payment_id) else {
            return Ok(None);
        };

        if let Some(status) = self.interference.lock().unwrap().take() {
            row.status = status.to_string();
        }

        if row.status != expected_status.as_str() {
            return Ok(None);
        }

        row.status = changes.status;
        if let Some(provider_payment_id) = changes.provider_payment_id {
            row.provider_payment_id = Some(provider_payment_id);
        }
        if let Some(paid_at) = changes.paid_at {
            row.paid_at = Some(paid_at);
        }
        if let Some(metadata) = changes.metadata {
            row.metadata = metadata;
        }
        if let Some(provider_data) = changes.provider_data {
            row.provider_data = Some(provider_data);
        }
        row.updated_at = changes.updated_at;

        Ok(Some(row.clone()))
    }

    async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<PaymentEntity>> {
        let mut payments: Vec<PaymentEntity> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|payment| payment.company_id == company_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }

    async fn list_by_company_between(
        &self,
        company_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PaymentEntity>> {
        let payments = self.list_by_company(company_id).await?;
        Ok(payments
            .into_iter()
            .filter(|payment| payment.created_at >= from && payment.created_at <= to)
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryCompanyRepository {
    plans: Mutex<HashMap<Uuid, Option<Uuid>>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl InMemoryCompanyRepository {
    pub(crate) fn with_company(company_id: Uuid) -> Self {
        let repo = Self::default();
        repo.plans.lock().unwrap().insert(company_id, None);
        repo
    }

    pub(crate) fn fail_updates(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub(crate) fn plan_of(&self, company_id: Uuid) -> Option<Uuid> {
        self.plans.lock().unwrap().get(&company_id).copied().flatten()
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
    async fn update_plan(&self, company_id: Uuid, plan_id: Uuid) -> Result<CompanyEntity> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("companies table unavailable"));
        }

        let mut plans = self.plans.lock().unwrap();
        let Some(plan) = plans.get_mut(&company_id) else {
            return Err(anyhow!("company {} not found", company_id));
        };
        *plan = Some(plan_id);

        Ok(CompanyEntity {
            id: company_id,
            plan_id: Some(plan_id),
            updated_at: Utc::now(),
        })
    }
}

#[derive(Default)]
pub(crate) struct RecordingAlertSink {
    alerts: Mutex<Vec<PlanActivationAlert>>,
}

impl RecordingAlertSink {
    pub(crate) fn alerts(&self) -> Vec<PlanActivationAlert> {
        self.alerts.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingAlertSink {
    fn plan_activation_failed(&self, alert: PlanActivationAlert) {
        self.alerts.lock().unwrap().push(alert);
    }
}
