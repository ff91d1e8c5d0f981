use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::catalog::CatalogImportError;
use crate::workflows::journey::router::status_for;
use crate::workflows::journey::JourneyError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Catalog(CatalogImportError),
    Journey(JourneyError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Catalog(err) => write!(f, "catalogue error: {}", err),
            AppError::Journey(err) => write!(f, "journey error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Journey(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Catalog(_) => StatusCode::BAD_REQUEST,
            AppError::Journey(err) => status_for(err),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<CatalogImportError> for AppError {
    fn from(value: CatalogImportError) -> Self {
        Self::Catalog(value)
    }
}

impl From<JourneyError> for AppError {
    fn from(value: JourneyError) -> Self {
        Self::Journey(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::journey::router::error_response;
    use crate::workflows::journey::{RepositoryError, Resource, TaskId};

    #[test]
    fn journey_errors_map_to_http_statuses() {
        let cases = [
            (
                AppError::from(JourneyError::NotFound(Resource::Profile)),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(JourneyError::Conflict("duplicate".to_string())),
                StatusCode::CONFLICT,
            ),
            (
                AppError::from(JourneyError::InvalidState("not yet".to_string())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::from(JourneyError::Store(RepositoryError::Unavailable(
                    "down".to_string(),
                ))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn app_and_router_responses_share_journey_statuses() {
        let errors = || {
            vec![
                JourneyError::NotFound(Resource::Task(TaskId(3))),
                JourneyError::Conflict("duplicate".to_string()),
                JourneyError::InvalidState("not yet".to_string()),
                JourneyError::Store(RepositoryError::Unavailable("down".to_string())),
            ]
        };

        for (routed, wrapped) in errors().into_iter().zip(errors()) {
            assert_eq!(
                AppError::from(wrapped).into_response().status(),
                error_response(routed).status()
            );
        }
    }

    #[test]
    fn config_error_message_is_prefixed() {
        let error = AppError::from(ConfigError::InvalidPort);
        assert_eq!(
            error.to_string(),
            "configuration error: APP_PORT must be a valid u16"
        );
    }
}
