use chrono::{DateTime, Utc};
use mockall::automock;
use tracing::warn;
use uuid::Uuid;

use super::notifier::{NotificationEvent, Notifier};
use super::config::ServiceContext;

/// A paid payment whose company plan could not be switched. The payment
/// itself is already durable; whoever receives this must reconcile the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanActivationAlert {
    pub payment_id: String,
    pub company_id: Uuid,
    pub plan_id: Uuid,
    pub provider: String,
    pub error: String,
    pub occurred_at: DateTime<Utc>,
}

#[automock]
pub trait AlertSink: Send + Sync {
    fn plan_activation_failed(&self, alert: PlanActivationAlert);
}

/// Writes alerts to the log only.
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn plan_activation_failed(&self, alert: PlanActivationAlert) {
        log_alert(&alert);
    }
}

/// Logs and additionally queues the alert for out-of-band delivery.
pub struct NotifyingAlertSink {
    notifier: Notifier,
    service_context: ServiceContext,
}

impl NotifyingAlertSink {
    pub(crate) fn new(notifier: Notifier, service_context: ServiceContext) -> Self {
        Self {
            notifier,
            service_context,
        }
    }
}

impl AlertSink for NotifyingAlertSink {
    fn plan_activation_failed(&self, alert: PlanActivationAlert) {
        log_alert(&alert);

        self.notifier.try_notify(NotificationEvent {
            service_context: self.service_context.clone(),
            alert,
        });
    }
}

fn log_alert(alert: &PlanActivationAlert) {
    warn!(
        payment_id = %alert.payment_id,
        company_id = %alert.company_id,
        plan_id = %alert.plan_id,
        provider = %alert.provider,
        error = %alert.error,
        "plan activation: payment is paid but plan was not switched"
    );
}
