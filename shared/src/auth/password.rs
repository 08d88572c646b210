//! # Password Hashing
//!
//! bcrypt hashing for stored user passwords.
//!
//! ## Why bcrypt
//!
//! User rows persist bcrypt digests (`$2b$...`), so hashing and verification
//! must speak the same format end to end - including digests minted by
//! external tooling and the development hash endpoint.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//!
//! // During registration
//! let digest = hasher.hash(&password)?;
//! // Store digest in the users table
//!
//! // During login
//! if hasher.verify(&password, &stored_digest)? {
//!     // Password correct
//! }
//! ```
//!
//! ## Security Notes
//!
//! - **Never store plaintext passwords**
//! - **Each digest includes a unique salt** - same password, different digests
//! - Verification is constant-time within bcrypt

use crate::errors::ApiError;

/// Password hashing service using bcrypt at the default cost.
///
/// `Clone + Send + Sync`; hashing generates a fresh random salt per call.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hashes a password for storage.
    ///
    /// Returns the bcrypt digest string (`$2b$12$...`).
    ///
    /// ## Errors
    ///
    /// Returns `ApiError::InternalError` if hashing fails (rare).
    pub fn hash(&self, password: &str) -> Result<String, ApiError> {
        bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| ApiError::InternalError {
            message: format!("password hashing failed: {}", e),
        })
    }

    /// Verifies a password against a stored digest.
    ///
    /// Returns `Ok(false)` for a wrong password; an error only when the
    /// stored digest itself is malformed.
    pub fn verify(&self, password: &str, digest: &str) -> Result<bool, ApiError> {
        bcrypt::verify(password, digest).map_err(|e| ApiError::InternalError {
            message: format!("password verification failed: {}", e),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();

        let digest = hasher.hash("correct horse battery staple").unwrap();
        assert!(digest.starts_with("$2"));

        assert!(hasher.verify("correct horse battery staple", &digest).unwrap());
        assert!(!hasher.verify("wrong password", &digest).unwrap());
    }

    #[test]
    fn test_same_password_different_digests() {
        let hasher = PasswordHasher::new();

        let first = hasher.hash("password123").unwrap();
        let second = hasher.hash("password123").unwrap();

        // Unique salts mean distinct digests
        assert_ne!(first, second);
        assert!(hasher.verify("password123", &first).unwrap());
        assert!(hasher.verify("password123", &second).unwrap());
    }

    #[test]
    fn test_malformed_digest_is_an_error() {
        let hasher = PasswordHasher::new();
        assert!(hasher.verify("password", "not-a-bcrypt-digest").is_err());
    }
}
