use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use crates::{
    domain::repositories::{companies::CompanyRepository, payments::PaymentRepository},
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{companies::CompanyPostgres, payments::PaymentPostgres},
    },
    observability::alerts::AlertSink,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    axum_http::error_responses::AppError,
    config::config_model::PaymentWebhook,
    usecases::payment_webhook::{PaymentWebhookError, PaymentWebhookUseCase, WebhookReceipt},
};

pub const WEBHOOK_SIGNATURE_HEADER: &str = "x-webhook-signature";
pub const ASAAS_SIGNATURE_HEADER: &str = "asaas-signature";

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub data: WebhookReceipt,
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    alert_sink: Arc<dyn AlertSink>,
    secrets: PaymentWebhook,
) -> Router {
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let company_repository = CompanyPostgres::new(Arc::clone(&db_pool));
    let usecase = PaymentWebhookUseCase::new(
        Arc::new(payment_repository),
        Arc::new(company_repository),
        alert_sink,
        secrets,
    );

    router(Arc::new(usecase))
}

pub fn router<Pay, Comp>(usecase: Arc<PaymentWebhookUseCase<Pay, Comp>>) -> Router
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Comp: CompanyRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(receive_webhook::<Pay, Comp>))
        .with_state(usecase)
}

pub async fn receive_webhook<Pay, Comp>(
    State(usecase): State<Arc<PaymentWebhookUseCase<Pay, Comp>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Comp: CompanyRepository + Send + Sync + 'static,
{
    info!(
        body_bytes = body.len(),
        "payment_webhook: delivery received"
    );

    let signature = signature_header(&headers);

    match usecase.handle_webhook(&body, signature).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(WebhookResponse {
                success: true,
                data: receipt,
            }),
        )
            .into_response(),
        Err(err) => map_error(err),
    }
}

/// First non-empty of `x-webhook-signature` and `asaas-signature`.
fn signature_header(headers: &HeaderMap) -> Option<&str> {
    [WEBHOOK_SIGNATURE_HEADER, ASAAS_SIGNATURE_HEADER]
        .into_iter()
        .filter_map(|name| headers.get(name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty())
}

fn map_error(err: PaymentWebhookError) -> Response {
    let status = err.status_code();

    if status.is_server_error() {
        error!(
            status = status.as_u16(),
            error = %err,
            "payment_webhook: delivery failed"
        );
    } else {
        warn!(
            status = status.as_u16(),
            error = %err,
            "payment_webhook: delivery rejected"
        );
    }

    AppError::from(err).into_response()
}
