use std::time::Duration;

pub const DEFAULT_IPV4_ENDPOINT: &str = "https://api.ipify.org?format=json";
pub const DEFAULT_IPV6_ENDPOINT: &str = "https://api64.ipify.org?format=json";
pub const DEFAULT_GEO_ENDPOINT: &str = "https://ipapi.co/json/";

#[derive(Debug, Clone)]
pub struct Config {
    pub ipv4_endpoint: String,
    pub ipv6_endpoint: String,
    pub geo_endpoint: String,
    /// Upper bound for each lookup; an expired request counts as failed.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ipv4_endpoint: DEFAULT_IPV4_ENDPOINT.to_string(),
            ipv6_endpoint: DEFAULT_IPV6_ENDPOINT.to_string(),
            geo_endpoint: DEFAULT_GEO_ENDPOINT.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: concat!("telemetry_rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
