use std::sync::Arc;

use axum::http::HeaderMap;
use telemetry_rs::{Schema, SummaryLayout, TelemetryCollector, TelemetrySnapshot};
use tokio::sync::RwLock;

use crate::{
    adapters::{
        device_report::{DeviceReport, ReportedHost},
        system_host::SystemHost,
    },
    app_config::AppConfig,
    domain::errors::AppError,
    infrastructure::telegram_bridge::TelegramBridge,
};

/// Owns the server's own snapshot and runs one-off collections for
/// reporting clients.
pub struct TelemetryService {
    collector: TelemetryCollector<SystemHost>,
    current: RwLock<TelemetrySnapshot>,
    layout: SummaryLayout,
    settings: Arc<AppConfig>,
    bridge: Option<Arc<TelegramBridge>>,
}

impl TelemetryService {
    /// Collects the first snapshot before returning, so readers never see a
    /// partial one.
    pub async fn start(
        settings: AppConfig,
        bridge: Option<Arc<TelegramBridge>>,
    ) -> Result<Self, AppError> {
        let layout = settings.summary_layout()?;
        let host = SystemHost::detect(&settings, bridge.clone());
        let collector = TelemetryCollector::new(host, Some(settings.telemetry_config()))?
            .with_schema(settings.schema());
        let first = collector.collect().await;
        Ok(Self {
            collector,
            current: RwLock::new(first),
            layout,
            settings: Arc::new(settings),
            bridge,
        })
    }

    pub async fn current(&self) -> TelemetrySnapshot {
        self.current.read().await.clone()
    }

    pub async fn refresh(&self) -> TelemetrySnapshot {
        let snapshot = self.collector.collect().await;
        *self.current.write().await = snapshot.clone();
        tracing::info!(id = %snapshot.id(), "Snapshot refreshed");
        snapshot
    }

    /// Sends the summary of the stored snapshot and returns the payload.
    pub async fn send_current(&self) -> Result<String, AppError> {
        let snapshot = self.current.read().await;
        Ok(self.collector.send(&snapshot, &self.layout)?)
    }

    /// Collects a snapshot for a reporting client. Reports carrying a Mini App
    /// context get the Mini App field set.
    pub async fn collect_reported(
        &self,
        report: DeviceReport,
        headers: &HeaderMap,
    ) -> Result<(TelemetrySnapshot, Option<String>), AppError> {
        let send = report.send;
        let schema = if report.mini_app.is_some() {
            Schema::mini_app()
        } else {
            self.settings.schema()
        };
        let host = ReportedHost::new(report, headers, self.bridge.clone());
        let collector = self.collector.with_host(host).with_schema(schema);

        if send {
            let snapshot = collector.collect_and_send(&self.layout).await?;
            let payload = snapshot.serialize(&self.layout)?;
            Ok((snapshot, Some(payload)))
        } else {
            Ok((collector.collect().await, None))
        }
    }
}
