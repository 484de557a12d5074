//! HTTP surface mounted under `/genidcard`.

pub mod handlers;
pub mod routes;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{foundation::error::CardError, service::CardGenerationService};

/// State shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Card generation and artifact lookup.
    pub service: Arc<CardGenerationService>,
}

impl AppState {
    /// State around an already assembled service.
    pub fn new(service: Arc<CardGenerationService>) -> Self {
        Self { service }
    }
}

/// A [`CardError`] rendered as a plain-text HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CardError);

impl From<CardError> for ApiError {
    fn from(e: CardError) -> Self {
        Self(e)
    }
}

impl ApiError {
    /// Status a failed generation maps to.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CardError::NoAvatarsAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(error = %self.0, status = status.as_u16(), "card request failed");
        let message = match &self.0 {
            CardError::NoAvatarsAvailable(_) => "no avatars available, add photos to the avatar directory",
            _ => "failed to generate id card",
        };
        (status, message).into_response()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/api/mod.rs"]
mod tests;
