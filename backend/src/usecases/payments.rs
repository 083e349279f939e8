use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use crates::domain::{
    repositories::payments::PaymentRepository,
    value_objects::{
        enums::payment_statuses::PaymentStatus,
        payments::{CreatePaymentModel, PaymentDto, PaymentSummary},
    },
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::payment_store_gateway::{
    GatewayError, GatewayOutcome, PaymentStoreGateway, StatusUpdateExtras,
};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment {0} not found")]
    NotFound(String),
    #[error("payment {payment_id} cannot move from {from} to {to}")]
    InvalidTransition {
        payment_id: String,
        from: String,
        to: PaymentStatus,
    },
    #[error("invalid payment request: {0}")]
    Invalid(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::InvalidTransition { .. } => StatusCode::CONFLICT,
            PaymentError::Invalid(_) => StatusCode::BAD_REQUEST,
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GatewayError> for PaymentError {
    fn from(value: GatewayError) -> Self {
        match value {
            GatewayError::NotFound(payment_id) => PaymentError::NotFound(payment_id),
            GatewayError::Store(err) => PaymentError::Internal(err),
            conflict @ GatewayError::Conflict { .. } => {
                PaymentError::Internal(anyhow::Error::new(conflict))
            }
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PaymentError>;

/// Application-side payment lifecycle: creation before checkout, and the
/// explicit cancel/refund moves that webhooks never make.
pub struct PaymentUseCase<Pay>
where
    Pay: PaymentRepository + Send + Sync + 'static,
{
    payment_repo: Arc<Pay>,
    gateway: PaymentStoreGateway<Pay>,
}

impl<Pay> PaymentUseCase<Pay>
where
    Pay: PaymentRepository + Send + Sync + 'static,
{
    pub fn new(payment_repo: Arc<Pay>) -> Self {
        Self {
            gateway: PaymentStoreGateway::new(Arc::clone(&payment_repo)),
            payment_repo,
        }
    }

    pub async fn create_payment(&self, model: CreatePaymentModel) -> UseCaseResult<PaymentDto> {
        if model.amount <= 0 {
            let err = PaymentError::Invalid("amount must be positive".to_string());
            warn!(
                company_id = %model.company_id,
                amount = model.amount,
                status = err.status_code().as_u16(),
                "payments: rejected non-positive amount"
            );
            return Err(err);
        }

        let payment = self
            .payment_repo
            .insert(model.to_entity())
            .await
            .map_err(|err| {
                error!(
                    company_id = %model.company_id,
                    db_error = ?err,
                    "payments: failed to insert payment"
                );
                PaymentError::Internal(err)
            })?;

        info!(
            payment_id = %payment.id,
            company_id = %payment.company_id,
            provider = %payment.provider,
            "payments: payment created"
        );
        Ok(PaymentDto::from(payment))
    }

    pub async fn get_payment(&self, payment_id: &str) -> UseCaseResult<PaymentDto> {
        let payment = self
            .payment_repo
            .find_by_id(payment_id.to_string())
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payments: failed to load payment");
                PaymentError::Internal(err)
            })?
            .ok_or_else(|| PaymentError::NotFound(payment_id.to_string()))?;

        Ok(PaymentDto::from(payment))
    }

    /// Newest first.
    pub async fn list_company_payments(&self, company_id: Uuid) -> UseCaseResult<Vec<PaymentDto>> {
        let payments = self
            .payment_repo
            .list_by_company(company_id)
            .await
            .map_err(|err| {
                error!(%company_id, db_error = ?err, "payments: failed to list payments");
                PaymentError::Internal(err)
            })?;

        Ok(payments.into_iter().map(PaymentDto::from).collect())
    }

    pub async fn cancel_payment(&self, payment_id: &str) -> UseCaseResult<PaymentDto> {
        info!(%payment_id, "payments: cancel requested");

        let outcome = self
            .gateway
            .apply_update(
                payment_id,
                PaymentStatus::Cancelled,
                StatusUpdateExtras::default(),
            )
            .await?;

        into_dto(payment_id, outcome)
    }

    /// Refunds a paid payment. `amount` defaults to the full payment amount
    /// and is recorded as `refund_amount` in the payment metadata.
    pub async fn refund_payment(
        &self,
        payment_id: &str,
        amount: Option<i64>,
    ) -> UseCaseResult<PaymentDto> {
        info!(%payment_id, ?amount, "payments: refund requested");

        let payment = self
            .payment_repo
            .find_by_id(payment_id.to_string())
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payments: failed to load payment");
                PaymentError::Internal(err)
            })?
            .ok_or_else(|| PaymentError::NotFound(payment_id.to_string()))?;

        let refund_amount = amount.unwrap_or(payment.amount);
        if refund_amount <= 0 || refund_amount > payment.amount {
            let err = PaymentError::Invalid(format!(
                "refund amount must be between 1 and {}",
                payment.amount
            ));
            warn!(
                %payment_id,
                refund_amount,
                status = err.status_code().as_u16(),
                "payments: rejected refund amount"
            );
            return Err(err);
        }

        let outcome = self
            .gateway
            .apply_update(
                payment_id,
                PaymentStatus::Refunded,
                StatusUpdateExtras {
                    metadata_patch: Some(json!({ "refund_amount": refund_amount })),
                    ..StatusUpdateExtras::default()
                },
            )
            .await?;

        into_dto(payment_id, outcome)
    }

    pub async fn payment_summary(
        &self,
        company_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> UseCaseResult<PaymentSummary> {
        if from > to {
            return Err(PaymentError::Invalid(
                "period start must not be after period end".to_string(),
            ));
        }

        let payments = self
            .payment_repo
            .list_by_company_between(company_id, from, to)
            .await
            .map_err(|err| {
                error!(%company_id, db_error = ?err, "payments: failed to load period payments");
                PaymentError::Internal(err)
            })?;

        Ok(PaymentSummary::from_payments(&payments, from, to))
    }
}

fn into_dto(payment_id: &str, outcome: GatewayOutcome) -> UseCaseResult<PaymentDto> {
    match outcome {
        GatewayOutcome::Applied(payment) | GatewayOutcome::AlreadyApplied(payment) => {
            Ok(PaymentDto::from(payment))
        }
        GatewayOutcome::Rejected { current, requested } => Err(PaymentError::InvalidTransition {
            payment_id: payment_id.to_string(),
            from: current.status,
            to: requested,
        }),
    }
}
