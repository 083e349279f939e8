use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

use super::alerts::PlanActivationAlert;
use super::config::ServiceContext;

const QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub(crate) struct NotificationEvent {
    pub(crate) service_context: ServiceContext,
    pub(crate) alert: PlanActivationAlert,
}

#[async_trait]
pub(crate) trait NotificationProvider: Send + Sync {
    async fn send(&self, event: &NotificationEvent) -> Result<()>;
    fn provider_name(&self) -> &'static str;
}

/// Bounded fan-out to notification providers. Delivery happens on a
/// background task; callers never wait on it.
#[derive(Clone)]
pub(crate) struct Notifier {
    tx: mpsc::Sender<NotificationEvent>,
}

impl Notifier {
    pub(crate) fn new(providers: Vec<Arc<dyn NotificationProvider>>) -> Self {
        let (tx, mut rx) = mpsc::channel::<NotificationEvent>(QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                for provider in &providers {
                    if let Err(error) = provider.send(&event).await {
                        warn!(
                            provider = provider.provider_name(),
                            payment_id = %event.alert.payment_id,
                            error = %error,
                            "notifier: provider failed to deliver alert"
                        );
                    }
                }
            }
        });

        Self { tx }
    }

    pub(crate) fn try_notify(&self, event: NotificationEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(
                    payment_id = %event.alert.payment_id,
                    "notifier: queue full; dropping alert"
                );
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                warn!(
                    payment_id = %event.alert.payment_id,
                    "notifier: queue closed; dropping alert"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;
    use tokio::sync::Notify;
    use uuid::Uuid;

    struct RecordingProvider {
        seen: Mutex<Vec<String>>,
        delivered: Notify,
    }

    #[async_trait]
    impl NotificationProvider for RecordingProvider {
        async fn send(&self, event: &NotificationEvent) -> Result<()> {
            self.seen.lock().unwrap().push(event.alert.payment_id.clone());
            self.delivered.notify_one();
            Ok(())
        }

        fn provider_name(&self) -> &'static str {
            "recording"
        }
    }

    #[tokio::test]
    async fn queued_alert_reaches_provider() {
        let provider = Arc::new(RecordingProvider {
            seen: Mutex::new(Vec::new()),
            delivered: Notify::new(),
        });
        let notifier = Notifier::new(vec![provider.clone() as Arc<dyn NotificationProvider>]);

        notifier.try_notify(NotificationEvent {
            service_context: ServiceContext {
                service_name: "payments".to_string(),
                environment: "test".to_string(),
                component: "backend".to_string(),
            },
            alert: PlanActivationAlert {
                payment_id: "pay-1".to_string(),
                company_id: Uuid::new_v4(),
                plan_id: Uuid::new_v4(),
                provider: "openpix".to_string(),
                error: "boom".to_string(),
                occurred_at: Utc::now(),
            },
        });

        provider.delivered.notified().await;

        assert_eq!(*provider.seen.lock().unwrap(), vec!["pay-1".to_string()]);
    }
}
