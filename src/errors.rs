// ABOUTME: Unified error handling with error codes and HTTP response mapping
// ABOUTME: Defines the outcome taxonomy shared by storage, OAuth, and goal-serving layers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Unified Error Handling
//!
//! Central error type for the step goals backend. Every fallible operation in
//! the crate returns [`AppResult`]; the HTTP layer renders an [`AppError`]
//! through its [`ErrorCode`]'s status mapping. Nothing is silently swallowed.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Fitbit client credentials have not been stored yet
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing,
    /// No OAuth token on file; the user never completed authorization
    #[serde(rename = "NOT_AUTHENTICATED")]
    NotAuthenticated,
    /// The stored refresh token was rejected; the user must authorize again
    #[serde(rename = "REAUTHORIZATION_REQUIRED")]
    ReauthorizationRequired,
    /// The one-shot authorization-code exchange was rejected by the provider
    #[serde(rename = "EXCHANGE_FAILED")]
    ExchangeFailed,
    /// Network failure, timeout, or upstream outage; safe to retry
    #[serde(rename = "TRANSIENT_ERROR")]
    TransientError,
    /// The durable store failed; the operation must not proceed unpersisted
    #[serde(rename = "PERSISTENCE_ERROR")]
    PersistenceError,
    /// The remote response did not have the expected shape
    #[serde(rename = "DECODE_ERROR")]
    DecodeError,
    /// The incoming request was malformed
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput,
    /// Unclassified internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            // Instructional, not a server fault: the operator has to finish setup
            Self::ConfigMissing => StatusCode::PRECONDITION_FAILED,

            Self::NotAuthenticated | Self::ReauthorizationRequired => StatusCode::UNAUTHORIZED,

            Self::InvalidInput => StatusCode::BAD_REQUEST,

            Self::ExchangeFailed | Self::DecodeError => StatusCode::BAD_GATEWAY,

            Self::TransientError => StatusCode::SERVICE_UNAVAILABLE,

            Self::PersistenceError | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-facing description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ConfigMissing => "Application credentials are not configured",
            Self::NotAuthenticated => "No Fitbit account is connected",
            Self::ReauthorizationRequired => "The Fitbit connection must be re-authorized",
            Self::ExchangeFailed => "Authorization code exchange failed",
            Self::TransientError => "A temporary upstream failure occurred",
            Self::PersistenceError => "Storage operation failed",
            Self::DecodeError => "Unexpected response from the Fitbit API",
            Self::InvalidInput => "The provided input is invalid",
            Self::InternalError => "An internal server error occurred",
        }
    }

}

/// Unified error type for the application
#[derive(Debug, Error)]
#[error("{}: {}", .code.description(), .message)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach a source error for chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// Credentials not yet stored
    pub fn config_missing() -> Self {
        Self::new(
            ErrorCode::ConfigMissing,
            "set the Fitbit client id and secret under /admin/settings first",
        )
    }

    /// No token on file
    pub fn not_authenticated() -> Self {
        Self::new(
            ErrorCode::NotAuthenticated,
            "visit /fitbit/auth to connect a Fitbit account",
        )
    }

    /// Refresh token rejected by the provider
    pub fn reauthorization_required(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ReauthorizationRequired, message)
    }

    /// Authorization code exchange rejected by the provider
    pub fn exchange_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExchangeFailed, message)
    }

    /// Retryable transport-level failure
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TransientError, message)
    }

    /// Durable store failure
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PersistenceError, message)
    }

    /// Remote payload did not decode
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DecodeError, message)
    }

    /// Malformed request input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Unclassified internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Body of an HTTP error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, "request failed: {}", self.message);
        } else {
            tracing::debug!(code = ?self.code, "request rejected: {}", self.message);
        }
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_http_status() {
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::TransientError.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorCode::ConfigMissing.http_status(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            ErrorCode::PersistenceError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_response_serialization() {
        let error = AppError::reauthorization_required("refresh token revoked");
        let response = ErrorResponse::from(error);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("REAUTHORIZATION_REQUIRED"));
        assert!(json.contains("refresh token revoked"));
    }
}
