//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quizroom_core::error::DomainError;
use quizroom_scenario::ScenarioError;
use serde::Serialize;
use thiserror::Error;

/// Startup errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The scenario could not be loaded.
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// Tracing or exporter setup failed.
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// The bot transport could not be built.
    #[error("transport error: {0}")]
    Transport(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<ScenarioError> for ApiError {
    fn from(err: ScenarioError) -> Self {
        Self(match err {
            ScenarioError::Domain(inner) => inner,
            ScenarioError::Missing(_) => DomainError::NotFound(err.to_string()),
            ScenarioError::Parse(_) => DomainError::Validation(err.to_string()),
            ScenarioError::Io { .. } => DomainError::Infrastructure(err.to_string()),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            DomainError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::NotFound("participant ghost".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_conflict_maps_to_409() {
        assert_eq!(
            status_of(DomainError::Conflict("position 1 taken".into())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(DomainError::Validation("blank name".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_infrastructure_maps_to_500() {
        assert_eq!(
            status_of(DomainError::Infrastructure("store down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_scenario_errors_map_by_kind() {
        assert_eq!(
            status_of(ScenarioError::Missing(PathBuf::from("scenario.yaml"))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ScenarioError::Parse("not a list".into())),
            StatusCode::BAD_REQUEST
        );
    }
}
