use axum::{http::StatusCode, response::IntoResponse};
use telemetry_rs::errors::TelemetryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("API error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("Telemetry error: {0}")]
    TelemetryError(#[from] TelemetryError),
    #[error("Telegram returned error ({status}): {body}")]
    BridgeError {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::TelemetryError(TelemetryError::NotReady { .. }) => StatusCode::CONFLICT,
            AppError::TelemetryError(TelemetryError::NoBridge) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::TelemetryError(TelemetryError::UnknownField(_)) => StatusCode::BAD_REQUEST,
            AppError::ReqwestError(_) | AppError::BridgeError { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, self.to_string()).into_response()
    }
}
