use anyhow::{Context, Result, anyhow};

use super::config_model::{BackendServer, Database, DotEnvyConfig, PaymentWebhook};

const DEFAULT_BODY_LIMIT_MIB: u64 = 1;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    load_from(|key| std::env::var(key).ok())
}

pub fn load_from<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} is not set"));

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?
            .parse()
            .context("SERVER_PORT_BACKEND is invalid")?,
        body_limit: match lookup("SERVER_BODY_LIMIT") {
            Some(raw) => raw.parse().context("SERVER_BODY_LIMIT is invalid")?,
            None => DEFAULT_BODY_LIMIT_MIB,
        },
        timeout: match lookup("SERVER_TIMEOUT") {
            Some(raw) => raw.parse().context("SERVER_TIMEOUT is invalid")?,
            None => DEFAULT_TIMEOUT_SECS,
        },
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let payment_webhook = PaymentWebhook {
        openpix_secret: lookup("OPENPIX_WEBHOOK_SECRET"),
        asaas_secret: lookup("ASAAS_WEBHOOK_SECRET"),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        payment_webhook,
    })
}
