use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::{catalog::CatalogError, playback::PlaybackError, state::engine::EngineError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The song catalog could not be loaded.
    #[error("song catalog unavailable: {0}")]
    Catalog(#[source] CatalogError),
    /// The catalog cannot anchor every team.
    #[error("{0}")]
    InsufficientSongs(String),
    /// Every song of the match has been drawn.
    #[error("no songs remaining in the catalog")]
    NoSongsRemaining,
    /// The playback provider rejected a direct control request.
    #[error("playback: {0}")]
    Playback(#[from] PlaybackError),
}

impl From<EngineError> for ServiceError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Config(message) => ServiceError::InvalidInput(message),
            EngineError::Catalog(source) => ServiceError::Catalog(source),
            err @ EngineError::InsufficientSongs { .. } => {
                ServiceError::InsufficientSongs(err.to_string())
            }
            EngineError::NoSongsRemaining => ServiceError::NoSongsRemaining,
            EngineError::InvalidState(message) => {
                error!(%message, "engine precondition violated");
                ServiceError::InvalidState(message)
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::Catalog(source) => AppError::ServiceUnavailable(format!(
                "{source}; restart the match to retry"
            )),
            ServiceError::InsufficientSongs(message) => AppError::Conflict(message),
            err @ ServiceError::NoSongsRemaining => AppError::Conflict(err.to_string()),
            ServiceError::Playback(source) => AppError::Conflict(source.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_http_statuses() {
        let cases = [
            (
                EngineError::Config("a match requires at least 2 teams".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                EngineError::Catalog(CatalogError::Timeout(std::time::Duration::from_secs(5))),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                EngineError::InsufficientSongs {
                    needed: 3,
                    available: 1,
                },
                StatusCode::CONFLICT,
            ),
            (EngineError::NoSongsRemaining, StatusCode::CONFLICT),
            (
                EngineError::InvalidState("cannot draw".into()),
                StatusCode::CONFLICT,
            ),
        ];

        for (err, expected) in cases {
            let app: AppError = ServiceError::from(err).into();
            assert_eq!(app.into_response().status(), expected);
        }
    }
}
