//! Best-effort run summary delivery to chat webhooks.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::io::config::WebhookConfig;

const DISCORD_EMBED_TITLE: &str = "Repository Processing Summary";
/// 0x3498DB.
const DISCORD_EMBED_COLOR: u32 = 3_447_003;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook rejected payload ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers a run summary somewhere. Never fails the run.
#[async_trait]
pub trait Notifier {
    async fn notify(&self, summary: &str);
}

/// Posts the summary to Slack (plain text) and/or Discord (embed).
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    http: reqwest::Client,
    targets: WebhookConfig,
}

impl WebhookNotifier {
    pub fn new(targets: WebhookConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            targets,
        }
    }

    async fn post(&self, url: &Url, payload: &Value) -> Result<(), NotifyError> {
        let resp = self.http.post(url.clone()).json(payload).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip_all)]
    async fn notify(&self, summary: &str) {
        if self.targets.is_empty() {
            debug!("no webhook configured, skipping notification");
            return;
        }
        if let Some(url) = &self.targets.slack {
            match self.post(url, &slack_payload(summary)).await {
                Ok(()) => info!("slack notification sent"),
                Err(err) => warn!(error = %err, "slack notification failed"),
            }
        }
        if let Some(url) = &self.targets.discord {
            match self.post(url, &discord_payload(summary)).await {
                Ok(()) => info!("discord notification sent"),
                Err(err) => warn!(error = %err, "discord notification failed"),
            }
        }
    }
}

fn slack_payload(summary: &str) -> Value {
    json!({ "text": summary })
}

fn discord_payload(summary: &str) -> Value {
    json!({
        "embeds": [{
            "title": DISCORD_EMBED_TITLE,
            "description": summary,
            "color": DISCORD_EMBED_COLOR,
            "timestamp": Utc::now().to_rfc3339(),
        }]
    })
}
