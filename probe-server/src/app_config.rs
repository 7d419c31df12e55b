use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use telemetry_rs::{
    errors::TelemetryError,
    types::{self, DEFAULT_GEO_ENDPOINT, DEFAULT_IPV4_ENDPOINT, DEFAULT_IPV6_ENDPOINT},
    Schema, SummaryLayout,
};

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    Standard,
    MiniApp,
}

/// Collection settings: `config.toml` first, then `PROBE_*` environment
/// variables.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub ipv4_endpoint: String,
    pub ipv6_endpoint: String,
    pub geo_endpoint: String,
    pub lookup_timeout_secs: u64,
    pub variant: Variant,
    pub summary: Vec<String>,
    // Static hints for the machine the server runs on
    pub screen_width: Option<u32>,
    pub screen_height: Option<u32>,
    pub pixel_ratio: Option<f64>,
    pub network_type: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ipv4_endpoint: DEFAULT_IPV4_ENDPOINT.to_string(),
            ipv6_endpoint: DEFAULT_IPV6_ENDPOINT.to_string(),
            geo_endpoint: DEFAULT_GEO_ENDPOINT.to_string(),
            lookup_timeout_secs: 10,
            variant: Variant::Standard,
            summary: ["ipv4", "ipv6", "isp", "os"].map(String::from).to_vec(),
            screen_width: None,
            screen_height: None,
            pixel_ratio: None,
            network_type: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let conf = Config::builder()
            .add_source(File::with_name("config.toml").required(false))
            .add_source(
                Environment::with_prefix("PROBE")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("summary"),
            )
            .build()?;

        conf.try_deserialize()
    }

    pub fn telemetry_config(&self) -> types::Config {
        types::Config {
            ipv4_endpoint: self.ipv4_endpoint.clone(),
            ipv6_endpoint: self.ipv6_endpoint.clone(),
            geo_endpoint: self.geo_endpoint.clone(),
            timeout: Duration::from_secs(self.lookup_timeout_secs.max(1)),
            user_agent: concat!("telemetry-probe-server/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn schema(&self) -> Schema {
        match self.variant {
            Variant::Standard => Schema::standard(),
            Variant::MiniApp => Schema::mini_app(),
        }
    }

    pub fn summary_layout(&self) -> Result<SummaryLayout, TelemetryError> {
        SummaryLayout::parse(&self.summary)
    }
}
