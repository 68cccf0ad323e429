use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use watchdog_core::{WatchdogError, WatchdogResult};

use crate::Notifier;

const DEFAULT_USERNAME: &str = "Task Worker Watchdog";

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    #[serde(skip_serializing_if = "is_blank")]
    channel: &'a str,
    text: &'a str,
    username: &'a str,
}

fn is_blank(value: &&str) -> bool {
    value.is_empty()
}

/// Slack风格的 incoming webhook 通知
pub struct WebhookNotifier {
    name: String,
    url: String,
    username: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new<N: Into<String>, U: Into<String>>(
        name: N,
        url: U,
        username: Option<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            username: username.unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            client,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, target: &str, message: &str) -> WatchdogResult<()> {
        let payload = WebhookPayload {
            channel: target,
            text: message,
            username: &self.username,
        };

        debug!("发送Webhook告警: channel={}, url={}", self.name, self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| WatchdogError::notification(&self.name, format!("请求失败: {e}")))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(WatchdogError::notification(
                &self.name,
                format!("HTTP {status} - {body}"),
            ))
        }
    }
}
