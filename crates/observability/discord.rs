use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde_json::json;
use url::Url;

use super::notifier::{NotificationEvent, NotificationProvider};

const CONTENT_LIMIT: usize = 2000;
const TRUNCATED_SUFFIX: &str = "\n… (truncated)";

pub(crate) struct DiscordWebhookProvider {
    webhook_url: Url,
    client: Client,
}

impl DiscordWebhookProvider {
    pub(crate) fn new(webhook_url: Url) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(3)).build()?;

        Ok(Self {
            webhook_url,
            client,
        })
    }
}

#[async_trait]
impl NotificationProvider for DiscordWebhookProvider {
    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&json!({ "content": format_content(event) }))
            .send()
            .await
            .map_err(sanitize_reqwest_error)?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "discord webhook returned non-success status: {}",
            response.status()
        ))
    }

    fn provider_name(&self) -> &'static str {
        "discord"
    }
}

pub(crate) fn format_content(event: &NotificationEvent) -> String {
    let context = &event.service_context;
    let alert = &event.alert;

    let lines = [
        format!(
            "**{}** `{}` `{}` `plan activation failed`",
            context.service_name, context.environment, context.component
        ),
        format!(
            "`{}`",
            alert.occurred_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        format!("- `payment_id` = `{}`", alert.payment_id),
        format!("- `company_id` = `{}`", alert.company_id),
        format!("- `plan_id` = `{}`", alert.plan_id),
        format!("- `provider` = `{}`", alert.provider),
        format!("> {}", alert.error.trim()),
    ];

    truncate_for_discord(lines.join("\n"))
}

// The URL carries the webhook token, so reqwest's own message is not reused.
fn sanitize_reqwest_error(error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("discord webhook request timed out");
    }
    if error.is_connect() {
        return anyhow!("discord webhook connection failed");
    }
    anyhow!("discord webhook request failed")
}

fn truncate_for_discord(content: String) -> String {
    if content.chars().count() <= CONTENT_LIMIT {
        return content;
    }

    let allowed = CONTENT_LIMIT.saturating_sub(TRUNCATED_SUFFIX.chars().count());
    let mut truncated: String = content.chars().take(allowed).collect();
    truncated.push_str(TRUNCATED_SUFFIX);
    truncated
}
