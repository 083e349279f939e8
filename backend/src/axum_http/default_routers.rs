use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::info;

use super::error_responses::AppError;

pub async fn not_found() -> Response {
    info!("backend router: not_found handler invoked");
    AppError::NotFound.into_response()
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}
