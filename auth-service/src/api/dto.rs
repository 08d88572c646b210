//! # Request / Response DTOs
//!
//! Wire types for the HTTP surface. Query and form fields default to empty
//! strings so the handlers can report precise "missing" errors instead of
//! failing deserialization.

use serde::{Deserialize, Serialize};
use validator::Validate;

// =============================================================================
// AUTHORIZE ENDPOINT
// =============================================================================

/// Query parameters of `GET /authorize`.
#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub response_type: String,
    #[serde(default)]
    pub scope: String,
    /// Redisplayed on the login form after a failed attempt.
    #[serde(default)]
    pub error: String,
}

/// Form fields of `POST /authorize` (the login form).
#[derive(Debug, Deserialize)]
pub struct AuthorizeForm {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub response_type: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// =============================================================================
// TOKEN ENDPOINT
// =============================================================================

/// Form fields of `POST /token`.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    #[serde(default)]
    pub grant_type: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

// =============================================================================
// ACCOUNT ENDPOINTS
// =============================================================================

/// Body of `POST /register`.
///
/// Field presence is checked by the handler first (missing-field response
/// code), then the email format through the validator derive.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of the registration-code response.
#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub code: String,
}

// =============================================================================
// MISC RESPONSES
// =============================================================================

/// Health probe response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Generic `{"message": ...}` success body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of the development bcrypt endpoint.
#[derive(Debug, Serialize)]
pub struct HashResponse {
    pub hash: String,
}

/// Query of the development bcrypt endpoint.
#[derive(Debug, Deserialize)]
pub struct BcryptQuery {
    #[serde(default)]
    pub text: String,
}

// =============================================================================
// TESTS
// =============================================================================
