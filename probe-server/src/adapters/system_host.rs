use std::{env, sync::Arc};

use telemetry_rs::{DeviceInfo, HostContext, MessagingBridge};

use crate::{app_config::AppConfig, infrastructure::telegram_bridge::TelegramBridge};

/// The machine this server runs on.
pub struct SystemHost {
    device: DeviceInfo,
    bridge: Option<Arc<TelegramBridge>>,
}

impl SystemHost {
    pub fn detect(settings: &AppConfig, bridge: Option<Arc<TelegramBridge>>) -> Self {
        let device = DeviceInfo {
            user_agent: Some(format!(
                "telemetry-probe-server/{} ({}; {})",
                env!("CARGO_PKG_VERSION"),
                env::consts::OS,
                env::consts::ARCH
            )),
            platform: Some(env::consts::OS.to_string()),
            architecture: Some(env::consts::ARCH.to_string()),
            screen_width: settings.screen_width,
            screen_height: settings.screen_height,
            pixel_ratio: settings.pixel_ratio,
            locale: system_locale(|key| env::var(key).ok()),
            network_type: settings.network_type.clone(),
        };
        tracing::debug!(?device, "Detected host device");
        Self { device, bridge }
    }
}

impl HostContext for SystemHost {
    fn device(&self) -> DeviceInfo {
        self.device.clone()
    }

    fn bridge(&self) -> Option<&dyn MessagingBridge> {
        self.bridge.as_deref().map(|b| b as &dyn MessagingBridge)
    }
}

/// POSIX locale lookup order, reduced to a language tag (`de_DE.UTF-8` -> `de-DE`).
fn system_locale(var: impl Fn(&str) -> Option<String>) -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .into_iter()
        .filter_map(|key| var(key))
        .map(|value| {
            let tag = value.split(['.', '@']).next().unwrap_or_default();
            tag.replace('_', "-")
        })
        .find(|tag| !tag.is_empty() && tag != "C" && tag != "POSIX")
}
