use std::env;

use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceContext {
    pub service_name: String,
    pub environment: String,
    pub component: String,
}

#[derive(Debug, Clone)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    pub(crate) discord_webhook_url: Option<Url>,
    /// Collected while parsing so they can be logged once tracing is up.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_lookup(component, |key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(component: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let component = component.trim().to_string();

        let service_context = ServiceContext {
            service_name: lookup("SERVICE_NAME").unwrap_or_else(|| component.clone()),
            environment: lookup("STAGE").unwrap_or_else(|| "unknown".to_string()),
            component,
        };

        let mut warnings = Vec::new();

        let enabled = match lookup("DISCORD_NOTIFY_ENABLED") {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                warnings.push(format!(
                    "DISCORD_NOTIFY_ENABLED is not a boolean (value: {raw}); treating as enabled"
                ));
                true
            }),
            None => true,
        };

        let discord_webhook_url = match lookup("DISCORD_WEBHOOK_URL") {
            Some(raw) if enabled => match Url::parse(&raw) {
                Ok(url) => Some(url),
                Err(err) => {
                    // The URL embeds a token; only the parse error is reported.
                    warnings.push(format!(
                        "DISCORD_WEBHOOK_URL is set but invalid; Discord alerts disabled (parse error: {err})"
                    ));
                    None
                }
            },
            _ => None,
        };

        Self {
            service_context,
            discord_webhook_url,
            warnings,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> ObservabilityConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ObservabilityConfig::from_lookup("backend", |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_component_and_unknown_stage() {
        let config = config_with(&[]);

        assert_eq!(config.service_context.service_name, "backend");
        assert_eq!(config.service_context.environment, "unknown");
        assert!(config.discord_webhook_url.is_none());
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn discord_url_enables_alerts() {
        let config = config_with(&[
            ("SERVICE_NAME", "payments"),
            ("STAGE", "prod"),
            ("DISCORD_WEBHOOK_URL", "https://discord.com/api/webhooks/1/abc"),
        ]);

        assert_eq!(config.service_context.service_name, "payments");
        assert_eq!(config.service_context.environment, "prod");
        assert!(config.discord_webhook_url.is_some());
    }

    #[test]
    fn disabled_flag_wins_over_url() {
        let config = config_with(&[
            ("DISCORD_NOTIFY_ENABLED", "off"),
            ("DISCORD_WEBHOOK_URL", "https://discord.com/api/webhooks/1/abc"),
        ]);

        assert!(config.discord_webhook_url.is_none());
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn invalid_url_becomes_a_warning_without_leaking_it() {
        let config = config_with(&[("DISCORD_WEBHOOK_URL", "not a url secret-token")]);

        assert!(config.discord_webhook_url.is_none());
        assert_eq!(config.warnings.len(), 1);
        assert!(!config.warnings[0].contains("secret-token"));
    }
}
