use std::sync::Arc;

use chrono::Utc;
use crates::{
    domain::{entities::payments::PaymentEntity, repositories::companies::CompanyRepository},
    observability::alerts::{AlertSink, PlanActivationAlert},
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// A paid payment whose plan switch failed. Never surfaced to the provider.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("plan {plan_id} not activated for company {company_id} (payment {payment_id}): {reason}")]
pub struct CascadeWarning {
    pub payment_id: String,
    pub company_id: Uuid,
    pub plan_id: Uuid,
    pub reason: String,
}

pub struct PlanActivation<Comp>
where
    Comp: CompanyRepository + Send + Sync + 'static,
{
    company_repo: Arc<Comp>,
    alert_sink: Arc<dyn AlertSink>,
}

impl<Comp> PlanActivation<Comp>
where
    Comp: CompanyRepository + Send + Sync + 'static,
{
    pub fn new(company_repo: Arc<Comp>, alert_sink: Arc<dyn AlertSink>) -> Self {
        Self {
            company_repo,
            alert_sink,
        }
    }

    /// Points the paying company at the purchased plan. Failures are handed
    /// to the alert sink for reconciliation and returned as a warning.
    pub async fn activate_plan(&self, payment: &PaymentEntity) -> Result<(), CascadeWarning> {
        match self
            .company_repo
            .update_plan(payment.company_id, payment.plan_id)
            .await
        {
            Ok(_) => {
                info!(
                    payment_id = %payment.id,
                    company_id = %payment.company_id,
                    plan_id = %payment.plan_id,
                    "plan_activation: company plan updated"
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    payment_id = %payment.id,
                    company_id = %payment.company_id,
                    plan_id = %payment.plan_id,
                    db_error = ?err,
                    "plan_activation: failed to update company plan"
                );

                self.alert_sink.plan_activation_failed(PlanActivationAlert {
                    payment_id: payment.id.clone(),
                    company_id: payment.company_id,
                    plan_id: payment.plan_id,
                    provider: payment.provider.clone(),
                    error: err.to_string(),
                    occurred_at: Utc::now(),
                });

                Err(CascadeWarning {
                    payment_id: payment.id.clone(),
                    company_id: payment.company_id,
                    plan_id: payment.plan_id,
                    reason: err.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::{COMPANY_ID, PLAN_ID, sample_payment};
    use anyhow::anyhow;
    use crates::{
        domain::{
            entities::companies::CompanyEntity, repositories::companies::MockCompanyRepository,
            value_objects::enums::payment_statuses::PaymentStatus,
        },
        observability::alerts::MockAlertSink,
    };
    use mockall::predicate::eq;

    #[tokio::test]
    async fn updates_company_plan_without_alerting() {
        let mut company_repo = MockCompanyRepository::new();
        company_repo
            .expect_update_plan()
            .with(eq(COMPANY_ID), eq(PLAN_ID))
            .times(1)
            .returning(|company_id, plan_id| {
                Box::pin(async move {
                    Ok(CompanyEntity {
                        id: company_id,
                        plan_id: Some(plan_id),
                        updated_at: Utc::now(),
                    })
                })
            });

        let mut alert_sink = MockAlertSink::new();
        alert_sink.expect_plan_activation_failed().never();

        let activation = PlanActivation::new(Arc::new(company_repo), Arc::new(alert_sink));

        let result = activation
            .activate_plan(&sample_payment("pay-1", PaymentStatus::Paid))
            .await;

        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn failure_is_reported_and_returned_as_warning() {
        let mut company_repo = MockCompanyRepository::new();
        company_repo
            .expect_update_plan()
            .times(1)
            .returning(|_, _| Box::pin(async { Err(anyhow!("connection reset")) }));

        let mut alert_sink = MockAlertSink::new();
        alert_sink
            .expect_plan_activation_failed()
            .withf(|alert| {
                alert.payment_id == "pay-1"
                    && alert.company_id == COMPANY_ID
                    && alert.plan_id == PLAN_ID
                    && alert.error == "connection reset"
            })
            .times(1)
            .return_const(());

        let activation = PlanActivation::new(Arc::new(company_repo), Arc::new(alert_sink));

        let warning = activation
            .activate_plan(&sample_payment("pay-1", PaymentStatus::Paid))
            .await
            .unwrap_err();

        assert_eq!(warning.payment_id, "pay-1");
        assert_eq!(warning.reason, "connection reset");
    }
}
