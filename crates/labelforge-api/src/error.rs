//! API error handling
//!
//! This module converts service errors into HTTP responses. Every failure
//! body has the shape `{"status": "Failed", "message": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use labelforge_service::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

/// Message returned for any remote store failure
pub const STORAGE_FAILURE_MESSAGE: &str = "Network or storage failure";

/// API error type that can be converted to HTTP responses
#[derive(Debug)]
pub struct ApiError {
    status_code: StatusCode,
    message: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    /// Create a bad request error (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Create a not found error (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Create a bad gateway error (502)
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    /// Create an internal server error (500)
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response JSON structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `"Failed"`
    pub status: String,

    /// Error message
    pub message: String,
}

impl ErrorResponse {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: "Failed".to_string(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code, Json(ErrorResponse::failed(self.message))).into_response()
    }
}

/// Convert ServiceError to ApiError
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => ApiError::bad_request(msg),
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            err @ ServiceError::AssetStore { .. } => {
                warn!(error = %err, "Remote asset store failure");
                ApiError::bad_gateway(STORAGE_FAILURE_MESSAGE)
            }
            ServiceError::Database(msg) => {
                error!("Database error: {}", msg);
                ApiError::internal_server_error(format!("Database error: {}", msg))
            }
            ServiceError::Internal(msg) => {
                error!("Internal error: {}", msg);
                ApiError::internal_server_error(format!("Internal error: {}", msg))
            }
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::bad_request(format!("Invalid multipart body: {}", err))
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use labelforge_service::BatchKind;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::bad_request("Invalid request");
        assert_eq!(err.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid request");
    }

    #[test]
    fn test_service_error_conversion() {
        let api_err: ApiError = ServiceError::NotFound("project 01H".to_string()).into();
        assert_eq!(api_err.status_code, StatusCode::NOT_FOUND);

        let api_err: ApiError = ServiceError::Validation("No files provided".to_string()).into();
        assert_eq!(api_err.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(api_err.message, "No files provided");

        let api_err: ApiError = ServiceError::Internal("boom".to_string()).into();
        assert_eq!(api_err.status_code, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_asset_store_error_is_generic() {
        let api_err: ApiError = ServiceError::AssetStore {
            kind: BatchKind::Upload,
            attempts: 3,
            message: "secret upstream detail".to_string(),
        }
        .into();

        assert_eq!(api_err.status_code, StatusCode::BAD_GATEWAY);
        assert_eq!(api_err.message, STORAGE_FAILURE_MESSAGE);
    }

    #[test]
    fn test_error_response_serialization() {
        let json = serde_json::to_string(&ErrorResponse::failed("Not found")).unwrap();
        assert_eq!(json, r#"{"status":"Failed","message":"Not found"}"#);
    }
}
