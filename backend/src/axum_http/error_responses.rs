use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::usecases::payment_webhook::PaymentWebhookError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Not found")]
    NotFound,

    /// 500 whose message is safe to show the caller.
    #[error("{0}")]
    Retryable(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Retryable(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PaymentWebhookError> for AppError {
    fn from(value: PaymentWebhookError) -> Self {
        match value {
            PaymentWebhookError::MalformedPayload(_) | PaymentWebhookError::UnsupportedProvider(_) => {
                AppError::BadRequest(value.to_string())
            }
            PaymentWebhookError::InvalidSignature => AppError::Unauthorized(value.to_string()),
            PaymentWebhookError::PaymentNotFound(_) => {
                AppError::Retryable("Payment not found".to_string())
            }
            PaymentWebhookError::Store(err) => AppError::Internal(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Display of `Internal` never includes the wrapped error.
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
