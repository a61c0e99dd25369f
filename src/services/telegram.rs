//! Telegram bot as the notification sink

use crate::config::TelegramSettings;
use crate::error::NotifyError;
use crate::models::AlertNotification;
use crate::services::join_segments;
use crate::services::notifier::Notifier;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: reqwest::Client,
    settings: TelegramSettings,
}

impl TelegramNotifier {
    pub fn new(client: reqwest::Client, settings: TelegramSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, alert: &AlertNotification) -> Result<(), NotifyError> {
        let bot_segment = format!("bot{}", self.settings.bot_token);
        let url = join_segments(&self.settings.api_url, &[&bot_segment, "sendMessage"])?;

        let request = SendMessageRequest {
            chat_id: &self.settings.chat_id,
            text: alert.to_html(),
            parse_mode: "HTML",
        };

        let response = self.client.post(url).json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let body = serde_json::from_str::<ApiReply>(&body)
                .ok()
                .and_then(|reply| reply.description)
                .unwrap_or(body);
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<ApiReply>(&body) {
            Ok(reply) if !reply.ok => Err(NotifyError::Rejected(
                reply
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            )),
            _ => {
                debug!(ticker = %alert.ticker, "Telegram accepted alert for {}", alert.ticker);
                Ok(())
            }
        }
    }
}
