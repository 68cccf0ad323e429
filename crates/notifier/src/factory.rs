use std::sync::Arc;

use watchdog_core::{NotifierConfig, WatchdogError, WatchdogResult};

use crate::{CommandNotifier, LogNotifier, NotificationChannel, WebhookNotifier};

/// 根据配置构建全部通知渠道
pub fn build_channels(configs: &[NotifierConfig]) -> WatchdogResult<Vec<NotificationChannel>> {
    let mut http_client: Option<reqwest::Client> = None;
    let mut channels = Vec::with_capacity(configs.len());

    for config in configs {
        let channel = match config {
            NotifierConfig::Command {
                name,
                target,
                program,
                args,
            } => NotificationChannel::new(
                name,
                target,
                Arc::new(CommandNotifier::new(name, program, args.clone())),
            ),
            NotifierConfig::Webhook {
                name,
                target,
                url,
                username,
            } => {
                let client = match &http_client {
                    Some(client) => client.clone(),
                    None => {
                        let client = reqwest::Client::builder().build().map_err(|e| {
                            WatchdogError::config_error(format!("创建HTTP客户端失败: {e}"))
                        })?;
                        http_client = Some(client.clone());
                        client
                    }
                };
                NotificationChannel::new(
                    name,
                    target,
                    Arc::new(WebhookNotifier::new(name, url, username.clone(), client)),
                )
            }
            NotifierConfig::Log { name, target } => {
                NotificationChannel::new(name, target, Arc::new(LogNotifier::new(name)))
            }
        };
        channels.push(channel);
    }

    Ok(channels)
}
