//! API error types and JSON error response formatting.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
    /// 503 Service Unavailable - external dependency not reachable.
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
        };
        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<intake_handoff::HandoffError> for ApiError {
    fn from(err: intake_handoff::HandoffError) -> Self {
        match &err {
            intake_handoff::HandoffError::Validation(msg) => ApiError::BadRequest(msg.clone()),
            intake_handoff::HandoffError::DependencyUnavailable(msg) => {
                ApiError::ServiceUnavailable(msg.clone())
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<intake_core::error::IntakeError> for ApiError {
    fn from(err: intake_core::error::IntakeError) -> Self {
        match &err {
            intake_core::error::IntakeError::InvalidInput(msg) => {
                ApiError::BadRequest(msg.clone())
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_maps_to_400() {
        let resp = ApiError::BadRequest("missing prompt".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_handoff_error_conversion() {
        let err = intake_handoff::HandoffError::DependencyUnavailable("CRM down".to_string());
        assert!(matches!(ApiError::from(err), ApiError::ServiceUnavailable(_)));

        let err = intake_handoff::HandoffError::RecordWrite("rejected".to_string());
        assert!(matches!(ApiError::from(err), ApiError::Internal(_)));
    }

    #[test]
    fn test_intake_error_conversion() {
        let err = intake_core::error::IntakeError::InvalidInput("bad address".to_string());
        assert!(matches!(ApiError::from(err), ApiError::BadRequest(_)));

        let err = intake_core::error::IntakeError::Storage("disk full".to_string());
        assert!(matches!(ApiError::from(err), ApiError::Internal(_)));
    }
}
