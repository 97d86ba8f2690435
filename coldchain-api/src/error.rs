use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coldchain_order::DispatchError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    /// The event is well-formed but the order cannot be evaluated yet
    UnprocessableError(String),
    /// Transition computed, write-back failed
    NotPersistedError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnprocessableError(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::NotPersistedError(msg) => {
                tracing::error!("Write-back failed: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        let msg = err.to_string();
        match err {
            DispatchError::OrderNotFound(_) => AppError::NotFoundError(msg),
            DispatchError::InvalidReading { .. } => AppError::ValidationError(msg),
            DispatchError::ContractNotFound(_)
            | DispatchError::InvalidContract(_)
            | DispatchError::Order(_) => AppError::UnprocessableError(msg),
            DispatchError::NotPersisted { .. } => AppError::NotPersistedError(msg),
            DispatchError::Registry(_) => AppError::InternalServerError(msg),
        }
    }
}
