pub mod app_state;
pub mod auth_middleware;
pub mod device_report;
pub mod http;
pub mod system_host;
