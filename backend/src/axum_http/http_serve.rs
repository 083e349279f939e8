use std::{any::Any, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Result, anyhow};
use axum::{
    Router,
    http::{
        HeaderName, Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::get,
};
use crates::{
    infra::db::postgres::postgres_connection::PgPoolSquad, observability::alerts::AlertSink,
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::{
    axum_http::{default_routers, error_responses::AppError, routers},
    config::config_model::{BackendServer, DotEnvyConfig},
};

pub async fn start(
    config: Arc<DotEnvyConfig>,
    db_pool: Arc<PgPoolSquad>,
    alert_sink: Arc<dyn AlertSink>,
) -> Result<()> {
    let payment_webhook = routers::payment_webhook::routes(
        Arc::clone(&db_pool),
        alert_sink,
        config.payment_webhook.clone(),
    );
    let app = build_router(&config.backend_server, payment_webhook)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Full middleware stack around the webhook router. Split from `start` so
/// tests can drive it without a database.
pub fn build_router(server: &BackendServer, payment_webhook: Router) -> Result<Router> {
    Ok(Router::new()
        .fallback(default_routers::not_found)
        .nest("/api/v1/payment-webhook", payment_webhook)
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.timeout),
        ))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes(
            server.body_limit,
        )?))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http()))
}

fn body_limit_bytes(body_limit_mib: u64) -> Result<usize> {
    let bytes = body_limit_mib
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow!("SERVER_BODY_LIMIT of {body_limit_mib} MiB is too large"))?;

    usize::try_from(bytes)
        .map_err(|_| anyhow!("SERVER_BODY_LIMIT of {body_limit_mib} MiB is too large"))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([
            Method::POST,
            Method::GET,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static("x-webhook-signature"),
            HeaderName::from_static("asaas-signature"),
        ])
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    error!(panic = %detail, "backend router: request handler panicked");
    AppError::Internal(anyhow!("request handler panicked")).into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
