use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use tourbook_core::CoreError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthenticated(msg) => AppError::AuthenticationError(msg),
            CoreError::Forbidden(msg) => AppError::AuthorizationError(msg),
            CoreError::InvalidInput(msg) => AppError::ValidationError(msg),
            CoreError::NotFound(msg) => AppError::NotFoundError(msg),
            CoreError::Conflict(msg) => AppError::ConflictError(msg),
            CoreError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_status_mapping() {
        let cases = [
            (CoreError::Unauthenticated("x".into()), StatusCode::UNAUTHORIZED),
            (CoreError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (CoreError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (CoreError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (CoreError::Conflict("x".into()), StatusCode::CONFLICT),
            (CoreError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }
}
