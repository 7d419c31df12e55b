use serde::{Deserialize, Serialize};

/// What the host environment can tell us about the device. Every accessor is
/// optional; absent values become field defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub user_agent: Option<String>,
    pub platform: Option<String>,
    pub architecture: Option<String>,
    pub screen_width: Option<u32>,
    pub screen_height: Option<u32>,
    pub pixel_ratio: Option<f64>,
    pub locale: Option<String>,
    pub network_type: Option<String>,
}

/// Profile and presentation facts supplied by a Telegram Mini App host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniAppContext {
    pub username: Option<String>,
    pub language_code: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
    pub color_scheme: Option<String>,
    pub platform: Option<String>,
}

/// Outbound channel for a serialized summary. Delivery is fire-and-forget:
/// implementations must not block and report failures on their own.
pub trait MessagingBridge: Send + Sync {
    fn send_data(&self, payload: String);
}

/// Capabilities the collector needs from its environment.
pub trait HostContext: Send + Sync + 'static {
    fn device(&self) -> DeviceInfo;

    fn mini_app(&self) -> Option<MiniAppContext> {
        None
    }

    fn bridge(&self) -> Option<&dyn MessagingBridge>;
}
