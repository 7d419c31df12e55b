use std::sync::Arc;

use anyhow::Context;

pub mod adapters;
pub mod app_config;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

use adapters::{app_state::AppState, http};
use application::services::telemetry_service::TelemetryService;
use infrastructure::telegram_bridge::TelegramBridge;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
        .init();

    let config = config::Config::from_env()?;
    let settings = app_config::AppConfig::load().context("Failed to load collection settings")?;

    let bridge = config
        .telegram
        .as_ref()
        .map(|telegram| Arc::new(TelegramBridge::new(telegram)));

    let telemetry_service = TelemetryService::start(settings, bridge)
        .await
        .context("Failed to start telemetry collection")?;

    let state = AppState {
        config: config.clone(),
        telemetry_service: Arc::new(telemetry_service),
    };

    let http_server = http::HttpServer::new(
        http::HttpServerConfig {
            port: &config.server_port,
        },
        state,
    )
    .await?;
    http_server.run().await
}
