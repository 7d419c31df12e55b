use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use super::app_state::AppState;
use crate::domain::errors::AppError;

/// Guards routes that change or transmit the stored snapshot.
pub struct AuthenticatedRequest;

impl<S> FromRequestParts<S> for AuthenticatedRequest
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));

        match token {
            Some(token) if token == state.config.server_access_token => Ok(AuthenticatedRequest),
            _ => {
                tracing::warn!(uri = %parts.uri, "Rejected request without a valid access token");
                Err(AppError::Unauthorized("missing or invalid bearer token".to_string()))
            }
        }
    }
}
