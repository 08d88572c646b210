//! # Application Error Types
//!
//! Unified error handling with automatic HTTP conversion and the stable
//! response codes the API contract promises.
//!
//! ## Error Categories
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                           ApiError Categories                            │
//! ├──────────────────────────┬───────────────────────┬───────────────────────┤
//! │ Authentication (401)     │ Authorization (403)   │ Client Input (400)    │
//! ├──────────────────────────┼───────────────────────┼───────────────────────┤
//! │ InvalidToken             │ MissingScope          │ InvalidRequestBody    │
//! │ InvalidCredentials       │ InvalidScopeRequest   │ BadRequest            │
//! │                          │                       │ MissingField          │
//! │                          │                       │ MissingParam          │
//! │                          │                       │ ValidationError       │
//! ├──────────────────────────┴───────────────────────┴───────────────────────┤
//! │ Server (500): DatabaseError, RedisError, InternalError                   │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Codes
//!
//! Codes are stable strings clients may branch on:
//!
//! | Code | Status | Meaning |
//! |-----------|-----|----------------------------------|
//! | GEN_00001 | 401 | Invalid or missing bearer token  |
//! | GEN_00002 | 400 | Invalid request body             |
//! | GEN_00003 | 400 | Missing field in body            |
//! | GEN_00004 | 400 | Missing parameter                |
//! | GEN_00005 | 403 | Missing or denied scope          |
//! | GEN_99999 | 500 | Internal server error            |
//!
//! ## HTTP Response Format
//!
//! All errors are serialized to a consistent JSON format:
//!
//! ```json
//! {
//!   "code": "GEN_00003",
//!   "error": "Missing field in body: email"
//! }
//! ```
//!
//! Server-side failures (database, Redis, script replies) never expose their
//! details; they are logged and collapse to `GEN_99999`.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidationErrors;

// =============================================================================
// Type Aliases
// =============================================================================

/// Result type alias for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Main Error Enum
// =============================================================================

/// Application error type with automatic HTTP status mapping.
///
/// Each variant represents a specific error condition and maps to an
/// appropriate HTTP status code and stable response code.
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Authentication Errors (401 Unauthorized)
    // =========================================================================

    /// Bearer token is missing, malformed, expired, or does not resolve in
    /// the token store. Returns 401.
    #[error("Invalid or missing bearer token.")]
    InvalidToken,

    /// Credential check failed: wrong email/password at the login form, or
    /// wrong client id/secret at the token endpoint. Returns 401.
    #[error("Invalid credentials")]
    InvalidCredentials,

    // =========================================================================
    // Authorization Errors (403 Forbidden)
    // =========================================================================

    /// The bearer's `scope` claim lacks a scope the route requires.
    /// Returns 403 with the missing scope named.
    #[error("Missing scope: {scope}")]
    MissingScope {
        /// The first required scope the token did not carry
        scope: String,
    },

    /// Scope authorization failed. One deliberately opaque message covers
    /// unknown client, unknown user, client-denied and user-denied scopes so
    /// callers cannot probe which side rejected the request. Returns 403.
    #[error("the requested scope is invalid, unknown, or malformed")]
    InvalidScopeRequest,

    // =========================================================================
    // Client Input Errors (400 Bad Request)
    // =========================================================================

    /// Request body could not be decoded.
    #[error("Invalid request body")]
    InvalidRequestBody,

    /// Generic client error with a handler-supplied message, used for the
    /// OAuth flow rejections (state mismatch, invalid code, unsupported
    /// grant type).
    #[error("{message}")]
    BadRequest {
        /// Human-readable description of what's wrong
        message: String,
    },

    /// A required body field is empty or absent.
    #[error("Missing field in body: {field}")]
    MissingField {
        /// Name(s) of the missing field(s)
        field: String,
    },

    /// A required query/form parameter is empty or absent.
    #[error("Missing parameter: {param}")]
    MissingParam {
        /// Name of the missing parameter
        param: String,
    },

    /// Request body failed validation rules.
    /// Contains field-level errors from the `validator` crate.
    #[error("Invalid request body")]
    ValidationError(#[from] ValidationErrors),

    // =========================================================================
    // Server Errors (500 Internal Server Error)
    // =========================================================================
    // Logged with full detail; clients only ever see GEN_99999.

    /// PostgreSQL query failed.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Redis operation failed.
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    /// Unspecified internal error (serialization failures, non-SUCCESS
    /// script replies, exhausted retries, ...).
    #[error("{message}")]
    InternalError {
        /// Internal message for logging (not exposed to clients)
        message: String,
    },
}

// =============================================================================
// Error Methods
// =============================================================================

impl ApiError {
    /// Returns the stable, machine-readable response code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken | Self::InvalidCredentials => "GEN_00001",
            Self::InvalidRequestBody
            | Self::BadRequest { .. }
            | Self::ValidationError(_) => "GEN_00002",
            Self::MissingField { .. } => "GEN_00003",
            Self::MissingParam { .. } => "GEN_00004",
            Self::MissingScope { .. } | Self::InvalidScopeRequest => "GEN_00005",
            Self::DatabaseError(_) | Self::RedisError(_) | Self::InternalError { .. } => {
                "GEN_99999"
            }
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// This is the source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 401 Unauthorized - Authentication required or failed
            Self::InvalidToken | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,

            // 403 Forbidden - Authenticated but not authorized
            Self::MissingScope { .. } | Self::InvalidScopeRequest => StatusCode::FORBIDDEN,

            // 400 Bad Request - Client sent invalid data
            Self::InvalidRequestBody
            | Self::BadRequest { .. }
            | Self::MissingField { .. }
            | Self::MissingParam { .. }
            | Self::ValidationError(_) => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error - Something went wrong on our side
            Self::DatabaseError(_) | Self::RedisError(_) | Self::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns `true` if this is a server-side error (5xx).
    ///
    /// Server errors are logged at ERROR level and must not expose their
    /// details to clients.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::RedisError(_) | Self::InternalError { .. }
        )
    }

    /// The message clients are allowed to see.
    ///
    /// Client errors surface their display message; server errors collapse
    /// to a generic line.
    pub fn public_message(&self) -> String {
        if self.is_server_error() {
            "Internal server error.".to_string()
        } else {
            self.to_string()
        }
    }
}

// =============================================================================
// Response Structure
// =============================================================================

/// Standard error response body for the API.
///
/// ```json
/// {"code": "GEN_00004", "error": "Missing parameter: text"}
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable response code for programmatic handling
    pub code: String,

    /// Human-readable message
    pub error: String,
}

impl ErrorResponse {
    /// Creates a response body from an `ApiError`, logging server-side
    /// details before they are masked.
    pub fn new(error: &ApiError) -> Self {
        if error.is_server_error() {
            tracing::error!(detail = %error, "internal server error");
        }

        Self {
            code: error.error_code().to_string(),
            error: error.public_message(),
        }
    }
}

// =============================================================================
// Actix-web Integration
// =============================================================================

/// Implements Actix-web's `ResponseError` trait.
///
/// This allows returning `ApiError` directly from handlers; the error is
/// automatically converted to an HTTP response with the right status code
/// and the `{"code", "error"}` JSON body.
impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        // Delegate to our implementation
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let response = ErrorResponse::new(self);
        HttpResponse::build(self.status_code()).json(response)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_errors_return_401() {
        assert_eq!(ApiError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::InvalidToken.error_code(), "GEN_00001");
    }

    #[test]
    fn test_missing_scope_returns_403() {
        let err = ApiError::MissingScope {
            scope: "admin".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.error_code(), "GEN_00005");
        assert_eq!(err.public_message(), "Missing scope: admin");
    }

    #[test]
    fn test_client_input_errors_return_400() {
        assert_eq!(
            ApiError::InvalidRequestBody.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::InvalidRequestBody.error_code(), "GEN_00002");

        let err = ApiError::MissingField {
            field: "email".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "GEN_00003");
        assert_eq!(err.public_message(), "Missing field in body: email");

        let err = ApiError::MissingParam {
            param: "text".to_string(),
        };
        assert_eq!(err.error_code(), "GEN_00004");
    }

    #[test]
    fn test_scope_denial_is_opaque() {
        assert_eq!(
            ApiError::InvalidScopeRequest.public_message(),
            "the requested scope is invalid, unknown, or malformed"
        );
        assert_eq!(
            ApiError::InvalidScopeRequest.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::InvalidScopeRequest.error_code(), "GEN_00005");
    }

    #[test]
    fn test_server_errors_are_masked() {
        let err = ApiError::InternalError {
            message: "script reply: ERR_MISSING_USER_ID".to_string(),
        };
        assert!(err.is_server_error());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "GEN_99999");
        assert_eq!(err.public_message(), "Internal server error.");
    }

    #[test]
    fn test_error_response_body_shape() {
        let err = ApiError::MissingField {
            field: "code, email, and password are required".to_string(),
        };
        let body = ErrorResponse::new(&err);
        assert_eq!(body.code, "GEN_00003");
        assert_eq!(
            body.error,
            "Missing field in body: code, email, and password are required"
        );
    }
}
