use serde::Serialize;
use telemetry_rs::MessagingBridge;

use crate::{config::TelegramConfig, domain::errors::AppError};

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Delivers summaries to a chat through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramBridge {
    client: reqwest::Client,
    url: String,
    chat_id: String,
}

impl TelegramBridge {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/bot{}/sendMessage", config.api_base, config.bot_token),
            chat_id: config.chat_id.clone(),
        }
    }

    pub async fn deliver(&self, payload: &str) -> Result<(), AppError> {
        let message = SendMessage {
            chat_id: &self.chat_id,
            text: payload,
        };
        let response = self.client.post(&self.url).json(&message).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<could not read body>".into());
            return Err(AppError::BridgeError { status, body });
        }

        tracing::debug!(chat_id = %self.chat_id, "Summary delivered to Telegram");
        Ok(())
    }
}

impl MessagingBridge for TelegramBridge {
    fn send_data(&self, payload: String) {
        let bridge = self.clone();
        tokio::spawn(async move {
            if let Err(e) = bridge.deliver(&payload).await {
                tracing::error!("Error sending summary to Telegram: {}", e);
            }
        });
    }
}
