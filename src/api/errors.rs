use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

use crate::errors::Error;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub detail: String,
    pub code: u16,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiError({}, {})", self.code, self.detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::Json(self);
        (status, body).into_response()
    }
}

/// Helper function to create API errors
pub fn api_error(status: StatusCode, message: &str) -> ApiError {
    ApiError {
        detail: message.to_string(),
        code: status.as_u16(),
    }
}

/// Maps engine errors onto the HTTP statuses clients rely on:
/// 422 for unparseable SQL, 406 for unknown dialects, 400 for anything else.
impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match &err {
            Error::Parse(reason) => {
                debug!("Rejecting unparseable SQL: {}", reason);
                api_error(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    &format!("Failed to parse SQL: {}", reason),
                )
            }
            Error::UnsupportedDialect(_) => {
                debug!("Rejecting request: {}", err);
                api_error(
                    StatusCode::NOT_ACCEPTABLE,
                    &format!("Unsupported SQL dialect: {}", err),
                )
            }
            _ => {
                warn!("Unexpected error while handling request: {}", err);
                api_error(
                    StatusCode::BAD_REQUEST,
                    &format!("An unexpected error occurred: {}", err),
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejecting request body: {}", rejection.body_text());
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            &format!("Invalid request: {}", rejection.body_text()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_status() {
        let err = ApiError::from(Error::Parse("Expected an expression".into()));
        assert_eq!(err.code, 422);
        assert_eq!(err.detail, "Failed to parse SQL: Expected an expression");
    }

    #[test]
    fn test_dialect_error_status() {
        let err = ApiError::from(Error::UnsupportedDialect("cobol".into()));
        assert_eq!(err.code, 406);
        assert_eq!(err.detail, "Unsupported SQL dialect: Unknown dialect 'cobol'");
    }

    #[test]
    fn test_other_errors_are_bad_requests() {
        let err = ApiError::from(Error::Unexpected("Invalid schema".into()));
        assert_eq!(err.code, 400);
        assert_eq!(err.detail, "An unexpected error occurred: Invalid schema");
    }

    #[test]
    fn test_error_serialization() {
        let json = serde_json::to_value(api_error(StatusCode::NOT_ACCEPTABLE, "nope")).unwrap();
        assert_eq!(json, serde_json::json!({"detail": "nope", "code": 406}));
    }
}
