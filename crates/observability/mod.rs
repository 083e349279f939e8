pub mod alerts;
mod config;
mod discord;
mod notifier;

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use alerts::{AlertSink, LogAlertSink, NotifyingAlertSink};
use config::ObservabilityConfig;
use discord::DiscordWebhookProvider;
use notifier::{NotificationProvider, Notifier};

pub use config::ServiceContext;

/// Installs the global subscriber and returns the sink plan-activation
/// alerts should be reported to. Must run inside a tokio runtime when a
/// Discord webhook is configured.
pub fn init_observability(component: &str) -> Result<Arc<dyn AlertSink>> {
    let config = ObservabilityConfig::from_env(component);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Local time so `TZ=America/Sao_Paulo` shows `-03:00` in logs.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()?;

    let context = &config.service_context;

    for warning in &config.warnings {
        warn!(
            service = %context.service_name,
            environment = %context.environment,
            component = %context.component,
            warning = %warning,
            "observability: config warning"
        );
    }

    let sink: Arc<dyn AlertSink> = match config.discord_webhook_url.clone() {
        Some(url) => {
            let provider = DiscordWebhookProvider::new(url)?;
            let notifier = Notifier::new(vec![Arc::new(provider) as Arc<dyn NotificationProvider>]);

            info!(
                service = %context.service_name,
                environment = %context.environment,
                component = %context.component,
                "observability: Discord alerts enabled"
            );
            Arc::new(NotifyingAlertSink::new(notifier, context.clone()))
        }
        None => {
            info!(
                service = %context.service_name,
                environment = %context.environment,
                component = %context.component,
                "observability: Discord alerts disabled"
            );
            Arc::new(LogAlertSink)
        }
    };

    Ok(sink)
}
