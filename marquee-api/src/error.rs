//! Error Types for the Marquee services
//!
//! This module defines error handling for the HTTP layer, including:
//! - ApiError struct carrying a code and a human-readable message
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! Error responses carry the message as a plain-text body so that upstream
//! failure text and validation messages reach callers byte-for-byte.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use marquee_core::{MarqueeError, StorageError, UpstreamError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request body failed field constraints
    ValidationFailed,

    /// Request contains malformed input data
    InvalidInput,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested entity does not exist
    EntityNotFound,

    // ========================================================================
    // Upstream Errors
    // ========================================================================
    /// An upstream rejected the request with a 4xx other than not-found
    UpstreamRejected,

    /// An upstream failed with a 5xx or was unreachable, after retries
    UpstreamUnavailable,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// The document store cannot be reached
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed | ErrorCode::InvalidInput | ErrorCode::UpstreamRejected => {
                StatusCode::BAD_REQUEST
            }

            ErrorCode::EntityNotFound => StatusCode::NOT_FOUND,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::UpstreamUnavailable | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Error returned by every Marquee endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Message sent to the caller as the response body
    pub message: String,

    /// Upstream status, when the error was relayed from another service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            upstream_status: None,
        }
    }

    pub fn with_upstream_status(mut self, status: u16) -> Self {
        self.upstream_status = Some(status);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a not-found error with a custom message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EntityNotFound, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(code = %self.code, status = status.as_u16(), message = %self.message, "Request failed");
        } else {
            tracing::debug!(code = %self.code, status = status.as_u16(), message = %self.message, "Request rejected");
        }
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.message,
        )
            .into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

/// Upstream failures keep their message verbatim and their status class.
impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        let status = err.status();
        let code = if err.is_not_found() {
            ErrorCode::EntityNotFound
        } else if err.is_client() {
            ErrorCode::UpstreamRejected
        } else {
            ErrorCode::UpstreamUnavailable
        };
        ApiError::new(code, err.message()).with_upstream_status(status)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation_failed(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable { .. } => {
                tracing::error!(error = %err, "Document store unavailable");
                ApiError::service_unavailable(err.to_string())
            }
        }
    }
}

impl From<MarqueeError> for ApiError {
    fn from(err: MarqueeError) -> Self {
        match err {
            MarqueeError::Upstream(e) => e.into(),
            MarqueeError::Validation(e) => e.into(),
            MarqueeError::Storage(e) => e.into(),
        }
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::ValidationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::EntityNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::UpstreamRejected.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::UpstreamUnavailable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_upstream_not_found_maps_to_404() {
        let err = ApiError::from(UpstreamError::not_found(
            "There is no MovieInfo available for the passed in Id : xyz",
        ));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.message,
            "There is no MovieInfo available for the passed in Id : xyz"
        );
        assert_eq!(err.upstream_status, Some(404));
    }

    #[test]
    fn test_upstream_server_error_keeps_body() {
        let err = ApiError::from(UpstreamError::server(503, "MovieInfo Service Unavailable"));
        assert_eq!(err.code, ErrorCode::UpstreamUnavailable);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "MovieInfo Service Unavailable");
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let err = ApiError::from(ValidationError::from_violations(vec![
            "rating.movieInfoId : must not be null".to_string(),
        ]));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "rating.movieInfoId : must not be null");
    }

    #[test]
    fn test_storage_errors() {
        let err = ApiError::from(StorageError::Unavailable {
            reason: "offline".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.message, "Store unavailable: offline");

        let err = ApiError::from(MarqueeError::from(UpstreamError::client(422, "bad key")));
        assert_eq!(err.code, ErrorCode::UpstreamRejected);
        assert_eq!(err.upstream_status, Some(422));
    }

    #[tokio::test]
    async fn test_response_body_is_plain_message() -> Result<(), axum::Error> {
        let response = ApiError::not_found("Review not found for the given Review id 7").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"text/plain; charset=utf-8"[..])
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(&bytes[..], b"Review not found for the given Review id 7");
        Ok(())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::service_unavailable("store offline");
        let display = format!("{}", err);
        assert!(display.contains("ServiceUnavailable"));
        assert!(display.contains("store offline"));
    }
}
