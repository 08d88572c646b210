//! # Request Validation Helpers
//!
//! Utilities for validating incoming request data using the `validator`
//! crate.
//!
//! ## How Validation Works
//!
//! DTOs derive `Validate` declaratively:
//!
//! ```rust,ignore
//! use validator::Validate;
//!
//! #[derive(Validate)]
//! struct RegisterRequest {
//!     #[validate(email)]
//!     email: String,
//!
//!     #[validate(custom(function = "validators::not_blank"))]
//!     code: String,
//! }
//! ```
//!
//! Validation failures map to a 400 response with the invalid-body code;
//! field-level details are logged rather than echoed to the client.

use crate::errors::ApiError;
use validator::Validate;

/// Validates a request DTO that implements `Validate`.
///
/// Use it in handlers to validate incoming data:
///
/// ```rust,ignore
/// async fn register(body: Json<RegisterRequest>) -> Result<impl Responder, ApiError> {
///     validate_request(&body)?;  // Returns early if invalid
/// }
/// ```
///
/// ## Errors
///
/// Returns `ApiError::ValidationError` if validation fails.
pub fn validate_request<T: Validate>(data: &T) -> Result<(), ApiError> {
    data.validate().map_err(ApiError::ValidationError)
}

/// Custom validation functions for use with `#[validate(custom)]`.
pub mod validators {
    use validator::ValidationError;

    /// Validates that a string is not blank (empty or whitespace-only).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("blank"));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::validators::*;
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_not_blank_valid() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("  hello  ").is_ok());
    }

    #[test]
    fn test_not_blank_invalid() {
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("\t\n").is_err());
    }

    #[test]
    fn test_validate_request_maps_to_api_error() {
        let bad = Probe {
            email: "not-an-email".to_string(),
        };
        let err = validate_request(&bad).unwrap_err();
        assert_eq!(err.error_code(), "GEN_00002");

        let good = Probe {
            email: "user@example.com".to_string(),
        };
        assert!(validate_request(&good).is_ok());
    }
}
