use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    catalog::LookupError, dao::storage::StorageError, state::transitions::InvalidTransition,
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Requested status change is not permitted by the lifecycle.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// Operation clashes with existing data (e.g. duplicate subscription).
    #[error("conflict: {0}")]
    Conflict(String),
    /// External catalog failed or timed out.
    #[error(transparent)]
    Catalog(#[from] LookupError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            duplicate @ StorageError::Duplicate { .. } => {
                ServiceError::Conflict(duplicate.to_string())
            }
            other => ServiceError::Unavailable(other),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Caller identity is missing or malformed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Well-formed request the lifecycle rules reject.
    #[error("unprocessable: {0}")]
    Unprocessable(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => {
                AppError::ServiceUnavailable(source.to_string())
            }
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::InvalidTransition(invalid) => {
                AppError::Unprocessable(invalid.to_string())
            }
            ServiceError::Conflict(message) => AppError::Conflict(message),
            ServiceError::Catalog(err) => AppError::ServiceUnavailable(err.to_string()),
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
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
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
    use crate::dao::models::GameStatus;

    #[test]
    fn duplicate_storage_error_becomes_conflict() {
        let err: ServiceError = StorageError::Duplicate {
            entity: "subscription",
            key: "x".into(),
        }
        .into();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn service_errors_map_to_http_status() {
        let cases = [
            (
                ServiceError::NotFound("game".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::Conflict("dup".into()),
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::InvalidTransition(InvalidTransition {
                    from: GameStatus::Released,
                    to: GameStatus::Upcoming,
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ServiceError::InvalidInput("title".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                StorageError::unavailable(
                    "ping failed".into(),
                    std::io::Error::from(std::io::ErrorKind::TimedOut),
                )
                .into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                LookupError::Timeout {
                    target: "zelda".into(),
                    timeout: std::time::Duration::from_secs(10),
                }
                .into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
