use std::sync::Arc;

use axum::http::{header, HeaderMap};
use serde::Deserialize;
use telemetry_rs::{DeviceInfo, HostContext, MessagingBridge, MiniAppContext};

use crate::infrastructure::telegram_bridge::TelegramBridge;

/// What a browser or Mini App client reports about itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceReport {
    #[serde(flatten)]
    pub device: DeviceInfo,
    pub mini_app: Option<MiniAppContext>,
    #[serde(default)]
    pub send: bool,
}

/// A reporting client, seen as a host for one collection run.
pub struct ReportedHost {
    device: DeviceInfo,
    mini_app: Option<MiniAppContext>,
    bridge: Option<Arc<TelegramBridge>>,
}

impl ReportedHost {
    /// Fills the user agent and locale from request headers when the report
    /// leaves them out.
    pub fn new(
        report: DeviceReport,
        headers: &HeaderMap,
        bridge: Option<Arc<TelegramBridge>>,
    ) -> Self {
        let mut device = report.device;
        if device.user_agent.is_none() {
            device.user_agent = header_value(headers, header::USER_AGENT);
        }
        if device.locale.is_none() {
            device.locale = header_value(headers, header::ACCEPT_LANGUAGE).and_then(|v| {
                v.split(',')
                    .next()
                    .map(|tag| tag.split(';').next().unwrap_or_default().trim().to_string())
                    .filter(|tag| !tag.is_empty() && tag != "*")
            });
        }
        Self {
            device,
            mini_app: report.mini_app,
            bridge,
        }
    }
}

impl HostContext for ReportedHost {
    fn device(&self) -> DeviceInfo {
        self.device.clone()
    }

    fn mini_app(&self) -> Option<MiniAppContext> {
        self.mini_app.clone()
    }

    fn bridge(&self) -> Option<&dyn MessagingBridge> {
        self.bridge.as_deref().map(|b| b as &dyn MessagingBridge)
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}
