use crates::domain::value_objects::enums::payment_providers::PaymentProvider;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub payment_webhook: PaymentWebhook,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendServer {
    pub port: u16,
    /// MiB
    pub body_limit: u64,
    /// Seconds
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

/// Shared secrets per provider. An unset secret makes every delivery from
/// that provider fail signature verification.
#[derive(Clone, Default)]
pub struct PaymentWebhook {
    pub openpix_secret: Option<String>,
    pub asaas_secret: Option<String>,
}

impl PaymentWebhook {
    pub fn secret_for(&self, provider: PaymentProvider) -> Option<&str> {
        match provider {
            PaymentProvider::OpenPix => self.openpix_secret.as_deref(),
            PaymentProvider::Asaas => self.asaas_secret.as_deref(),
        }
    }
}

impl std::fmt::Debug for PaymentWebhook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentWebhook")
            .field("openpix_secret", &self.openpix_secret.as_ref().map(|_| "[REDACTED]"))
            .field("asaas_secret", &self.asaas_secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
