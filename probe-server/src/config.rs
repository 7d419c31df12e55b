use std::env;

use anyhow::Context;

const SERVER_PORT_KEY: &str = "SERVER_PORT";

const SERVER_ACCESS_TOKEN: &str = "SERVER_ACCESS_TOKEN";

const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";

const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

const TELEGRAM_API_BASE: &str = "TELEGRAM_API_BASE";

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_port: String,
    pub server_access_token: String,
    /// `None` unless both the bot token and the chat id are set.
    pub telegram: Option<TelegramConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let load = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("failed to load environment variable {}", key))
        };

        let server_port = load(SERVER_PORT_KEY).unwrap_or("3000".to_string());

        let server_access_token =
            load(SERVER_ACCESS_TOKEN).context("Failed to get server access token")?;

        let telegram = match (load(TELEGRAM_BOT_TOKEN), load(TELEGRAM_CHAT_ID)) {
            (Ok(bot_token), Ok(chat_id)) => Some(TelegramConfig {
                bot_token,
                chat_id,
                api_base: load(TELEGRAM_API_BASE)
                    .unwrap_or(DEFAULT_TELEGRAM_API_BASE.to_string())
                    .trim_end_matches('/')
                    .to_string(),
            }),
            _ => {
                tracing::debug!("Telegram bot token or chat id not configured, bridge disabled");
                None
            }
        };

        Ok(Config {
            server_port,
            server_access_token,
            telegram,
        })
    }
}
