use std::sync::Arc;

use axum::http::StatusCode;
use crates::{
    domain::{
        repositories::{companies::CompanyRepository, payments::PaymentRepository},
        value_objects::{
            enums::{payment_providers::PaymentProvider, payment_statuses::PaymentStatus},
            payment_webhook::{NormalizedEvent, PaymentWebhookEnvelope},
            payments::PaymentDto,
        },
    },
    observability::alerts::AlertSink,
    payments::{providers::adapter_for, signature::verify_webhook_signature},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::config_model::PaymentWebhook;

use super::{
    payment_store_gateway::{GatewayError, PaymentStoreGateway, StatusUpdateExtras},
    plan_activation::PlanActivation,
};

#[derive(Debug, Error)]
pub enum PaymentWebhookError {
    /// The detail is logged, never returned to the caller.
    #[error("Invalid webhook payload")]
    MalformedPayload(String),
    #[error("Unsupported payment provider")]
    UnsupportedProvider(String),
    #[error("Invalid webhook signature")]
    InvalidSignature,
    #[error("payment {0} not found")]
    PaymentNotFound(String),
    #[error(transparent)]
    Store(anyhow::Error),
}

impl PaymentWebhookError {
    /// 5xx asks the provider to redeliver later.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentWebhookError::MalformedPayload(_)
            | PaymentWebhookError::UnsupportedProvider(_) => StatusCode::BAD_REQUEST,
            PaymentWebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            PaymentWebhookError::PaymentNotFound(_) | PaymentWebhookError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<GatewayError> for PaymentWebhookError {
    fn from(value: GatewayError) -> Self {
        match value {
            GatewayError::NotFound(payment_id) => PaymentWebhookError::PaymentNotFound(payment_id),
            GatewayError::Store(err) => PaymentWebhookError::Store(err),
            conflict @ GatewayError::Conflict { .. } => {
                PaymentWebhookError::Store(anyhow::Error::new(conflict))
            }
        }
    }
}

/// `data` of a successful webhook response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WebhookReceipt {
    Payment(PaymentDto),
    NotProcessed(UnprocessedEvent),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnprocessedEvent {
    pub processed: bool,
    pub message: String,
    pub event: String,
}

pub struct PaymentWebhookUseCase<Pay, Comp>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Comp: CompanyRepository + Send + Sync + 'static,
{
    gateway: PaymentStoreGateway<Pay>,
    plan_activation: PlanActivation<Comp>,
    secrets: PaymentWebhook,
}

impl<Pay, Comp> PaymentWebhookUseCase<Pay, Comp>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Comp: CompanyRepository + Send + Sync + 'static,
{
    pub fn new(
        payment_repo: Arc<Pay>,
        company_repo: Arc<Comp>,
        alert_sink: Arc<dyn AlertSink>,
        secrets: PaymentWebhook,
    ) -> Self {
        Self {
            gateway: PaymentStoreGateway::new(payment_repo),
            plan_activation: PlanActivation::new(company_repo, alert_sink),
            secrets,
        }
    }

    /// Runs one delivery through verification, normalization, the store and
    /// the plan cascade. `payload` must be the raw request body the
    /// signature was computed over.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookReceipt, PaymentWebhookError> {
        let raw_payload: Value = serde_json::from_slice(payload).map_err(malformed)?;

        let envelope: PaymentWebhookEnvelope =
            serde_json::from_value(raw_payload.clone()).map_err(malformed)?;

        let provider = PaymentProvider::from_str(&envelope.provider).ok_or_else(|| {
            warn!(
                provider = %envelope.provider,
                "payment_webhook: unsupported provider"
            );
            PaymentWebhookError::UnsupportedProvider(envelope.provider.clone())
        })?;

        self.check_signature(provider, payload, signature)?;

        info!(
            provider = %provider,
            event = %envelope.event,
            "payment_webhook: delivery verified"
        );

        let command = match adapter_for(provider)
            .normalize(&envelope.event, &envelope.data, &raw_payload)
            .map_err(malformed)?
        {
            NormalizedEvent::Update(command) => command,
            NormalizedEvent::Unhandled { provider, event } => {
                info!(
                    provider = %provider,
                    event = %event,
                    "payment_webhook: event acknowledged but not processed"
                );
                return Ok(WebhookReceipt::NotProcessed(UnprocessedEvent {
                    processed: false,
                    message: "Event received but not processed".to_string(),
                    event,
                }));
            }
        };

        let requested_status = command.status;
        let outcome = self
            .gateway
            .apply_update(
                &command.external_reference,
                requested_status,
                StatusUpdateExtras {
                    provider_payment_id: command.provider_payment_id,
                    paid_at: command.paid_at,
                    provider_data: Some(command.raw_payload),
                    metadata_patch: None,
                },
            )
            .await?;

        let payment = outcome.into_payment();

        if requested_status == PaymentStatus::Paid && payment.is_paid() {
            if let Err(warning) = self.plan_activation.activate_plan(&payment).await {
                warn!(
                    payment_id = %payment.id,
                    warning = %warning,
                    "payment_webhook: acknowledging delivery despite plan activation failure"
                );
            }
        }

        Ok(WebhookReceipt::Payment(PaymentDto::from(payment)))
    }

    fn check_signature(
        &self,
        provider: PaymentProvider,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<(), PaymentWebhookError> {
        let Some(secret) = self.secrets.secret_for(provider) else {
            warn!(provider = %provider, "payment_webhook: no secret configured for provider");
            return Err(PaymentWebhookError::InvalidSignature);
        };

        let Some(signature) = signature else {
            warn!(provider = %provider, "payment_webhook: signature header missing");
            return Err(PaymentWebhookError::InvalidSignature);
        };

        if !verify_webhook_signature(payload, signature, secret) {
            warn!(provider = %provider, "payment_webhook: signature mismatch");
            return Err(PaymentWebhookError::InvalidSignature);
        }

        Ok(())
    }
}

fn malformed(err: impl std::fmt::Display) -> PaymentWebhookError {
    let detail = err.to_string();
    warn!(detail = %detail, "payment_webhook: malformed payload");
    PaymentWebhookError::MalformedPayload(detail)
}
