use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::applications::ApplicationServiceError;
use crate::workflows::estimator::EstimateError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("estimate error: {0}")]
    Estimate(#[from] EstimateError),
    #[error("application error: {0}")]
    Application(#[from] ApplicationServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Estimate(EstimateError::UnknownRegion(_)) => StatusCode::NOT_FOUND,
            AppError::Estimate(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Application(ApplicationServiceError::NotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            AppError::Application(ApplicationServiceError::Forbidden(_)) => StatusCode::FORBIDDEN,
            AppError::Application(ApplicationServiceError::InvalidInput(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Application(
                ApplicationServiceError::InvalidTransition(_)
                | ApplicationServiceError::Conflict(_),
            ) => StatusCode::CONFLICT,
            AppError::Application(ApplicationServiceError::Repository(_))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
