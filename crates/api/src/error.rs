use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use locker_core::error::{CoreError, StoreError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `locker_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Core(err.into())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn internal(message: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %message, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Status, error code, and client-facing message for a domain error.
pub fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::AlreadyOccupied { .. } => {
            (StatusCode::CONFLICT, "ALREADY_OCCUPIED", core.to_string())
        }
        CoreError::LastElement { .. } => (StatusCode::CONFLICT, "LAST_ELEMENT", core.to_string()),
        CoreError::OccupiedAxisElement { .. } => {
            (StatusCode::CONFLICT, "OCCUPIED_AXIS_ELEMENT", core.to_string())
        }
        CoreError::EmptyCanvas => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "EMPTY_CANVAS",
            core.to_string(),
        ),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::PermissionDenied(msg) => {
            tracing::warn!(error = %msg, "Store refused access");
            (
                StatusCode::FORBIDDEN,
                "PERMISSION_DENIED",
                "Permission denied".to_string(),
            )
        }
        CoreError::PartialFailure { .. } => {
            tracing::warn!(error = %core, "Partial failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PARTIAL_FAILURE",
                core.to_string(),
            )
        }
        CoreError::Store(StoreError::Unavailable(msg)) => {
            tracing::error!(error = %msg, "Store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "The data store is temporarily unavailable".to_string(),
            )
        }
        CoreError::Store(StoreError::Conflict(msg)) => {
            (StatusCode::CONFLICT, "CONFLICT", msg.clone())
        }
        CoreError::Store(StoreError::PermissionDenied(msg)) => {
            tracing::warn!(error = %msg, "Store refused access");
            (
                StatusCode::FORBIDDEN,
                "PERMISSION_DENIED",
                "Permission denied".to_string(),
            )
        }
        CoreError::Store(StoreError::Backend(msg)) => internal(msg),
        CoreError::Internal(msg) => internal(msg),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => internal(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
