use std::sync::Arc;

use chrono::{DateTime, Utc};
use crates::domain::{
    entities::payments::{PaymentEntity, PaymentStatusChangeset},
    repositories::payments::PaymentRepository,
    value_objects::enums::payment_statuses::{PaymentStatus, StatusTransition},
};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

/// How many times a status change is re-decided after losing a race to a
/// concurrent writer.
pub const MAX_UPDATE_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment {0} not found")]
    NotFound(String),
    #[error("payment {payment_id} changed concurrently {attempts} times in a row")]
    Conflict { payment_id: String, attempts: usize },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdateExtras {
    pub provider_payment_id: Option<String>,
    /// Only used when the update lands on `paid`; defaults to now.
    pub paid_at: Option<DateTime<Utc>>,
    pub provider_data: Option<Value>,
    /// Keys merged into the stored metadata object.
    pub metadata_patch: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayOutcome {
    Applied(PaymentEntity),
    AlreadyApplied(PaymentEntity),
    /// The stored status does not permit the requested move. Nothing was written.
    Rejected {
        current: PaymentEntity,
        requested: PaymentStatus,
    },
}

impl GatewayOutcome {
    pub fn payment(&self) -> &PaymentEntity {
        match self {
            GatewayOutcome::Applied(payment) | GatewayOutcome::AlreadyApplied(payment) => payment,
            GatewayOutcome::Rejected { current, .. } => current,
        }
    }

    pub fn into_payment(self) -> PaymentEntity {
        match self {
            GatewayOutcome::Applied(payment) | GatewayOutcome::AlreadyApplied(payment) => payment,
            GatewayOutcome::Rejected { current, .. } => current,
        }
    }
}

pub struct PaymentStoreGateway<Pay>
where
    Pay: PaymentRepository + Send + Sync + 'static,
{
    payment_repo: Arc<Pay>,
}

impl<Pay> PaymentStoreGateway<Pay>
where
    Pay: PaymentRepository + Send + Sync + 'static,
{
    pub fn new(payment_repo: Arc<Pay>) -> Self {
        Self { payment_repo }
    }

    /// Moves the payment identified by `reference` to `status` when the
    /// transition table allows it. Each write is guarded by the status that
    /// was read, so a concurrent change forces a fresh read and decision.
    pub async fn apply_update(
        &self,
        reference: &str,
        status: PaymentStatus,
        extras: StatusUpdateExtras,
    ) -> Result<GatewayOutcome, GatewayError> {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let current = self
                .payment_repo
                .find_by_id(reference.to_string())
                .await
                .map_err(|err| {
                    error!(
                        payment_id = %reference,
                        db_error = ?err,
                        "payment_store: failed to load payment"
                    );
                    GatewayError::Store(err)
                })?
                .ok_or_else(|| {
                    warn!(payment_id = %reference, "payment_store: payment not found");
                    GatewayError::NotFound(reference.to_string())
                })?;

            let current_status = current.payment_status()?;

            match current_status.check_transition(status) {
                StatusTransition::AlreadyApplied => {
                    info!(
                        payment_id = %reference,
                        status = %status,
                        "payment_store: status already applied; nothing to do"
                    );
                    return Ok(GatewayOutcome::AlreadyApplied(current));
                }
                StatusTransition::Rejected => {
                    warn!(
                        payment_id = %reference,
                        current_status = %current_status,
                        requested_status = %status,
                        "payment_store: transition not allowed; ignoring update"
                    );
                    return Ok(GatewayOutcome::Rejected {
                        current,
                        requested: status,
                    });
                }
                StatusTransition::Allowed => {}
            }

            let changes = build_changeset(&current, status, &extras);

            let updated = self
                .payment_repo
                .update_status_if_current(reference.to_string(), current_status, changes)
                .await
                .map_err(|err| {
                    error!(
                        payment_id = %reference,
                        db_error = ?err,
                        "payment_store: failed to update payment status"
                    );
                    GatewayError::Store(err)
                })?;

            match updated {
                Some(payment) => {
                    info!(
                        payment_id = %reference,
                        from = %current_status,
                        to = %status,
                        "payment_store: status updated"
                    );
                    return Ok(GatewayOutcome::Applied(payment));
                }
                None => {
                    warn!(
                        payment_id = %reference,
                        attempt,
                        expected_status = %current_status,
                        "payment_store: status changed underneath update; retrying"
                    );
                }
            }
        }

        error!(
            payment_id = %reference,
            attempts = MAX_UPDATE_ATTEMPTS,
            "payment_store: giving up after repeated concurrent changes"
        );
        Err(GatewayError::Conflict {
            payment_id: reference.to_string(),
            attempts: MAX_UPDATE_ATTEMPTS,
        })
    }
}

fn build_changeset(
    current: &PaymentEntity,
    status: PaymentStatus,
    extras: &StatusUpdateExtras,
) -> PaymentStatusChangeset {
    let now = Utc::now();

    PaymentStatusChangeset {
        status: status.to_string(),
        provider_payment_id: extras.provider_payment_id.clone(),
        paid_at: match status {
            PaymentStatus::Paid => Some(extras.paid_at.unwrap_or(now)),
            _ => None,
        },
        metadata: extras
            .metadata_patch
            .as_ref()
            .map(|patch| merge_metadata(&current.metadata, patch)),
        provider_data: extras.provider_data.clone(),
        updated_at: now,
    }
}

/// Shallow merge of `patch` into `base`. A non-object on either side means
/// the patch wins outright.
pub fn merge_metadata(base: &Value, patch: &Value) -> Value {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            let mut merged = base.clone();
            for (key, value) in patch {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        _ => patch.clone(),
    }
}
