use std::sync::Arc;

use crate::{application::services::telemetry_service::TelemetryService, config::Config};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub telemetry_service: Arc<TelemetryService>,
}
