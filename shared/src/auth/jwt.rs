//! # JWT Access Tokens
//!
//! HS256 signing and verification for the access tokens the server issues.
//!
//! ## Token Shape
//!
//! Header: `{"alg": "HS256", "kid": "jwt-key", "typ": "JWT"}`
//!
//! Claims:
//!
//! | Claim | Description | Example |
//! |-------|-------------|---------|
//! | `sub` | User id (32-char hex) | `eb5dc850f1fb40a8b9b2bffd89c6a32d` |
//! | `scope` | Space-separated authorized scopes | `profile search` |
//! | `exp` | Expiration (unix seconds) | issued-at + 24 h |
//! | `iat` | Issued at (unix seconds) | |
//!
//! The `scope` claim is bound at signing time from the scope set the scope
//! authority approved; verifiers split it on spaces and compare against the
//! scopes a route requires.
//!
//! ## Security Notes
//!
//! - Tokens are rejected unless the header algorithm is exactly HS256
//! - Expiry is enforced during verification
//! - The signing secret never appears in `Debug` output

use crate::config::JwtConfig;
use crate::errors::ApiError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

// =============================================================================
// Claims
// =============================================================================

/// Claim set carried by every issued access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject - the user's 32-character id.
    pub sub: String,

    /// Space-separated scopes authorized for this token.
    #[serde(default)]
    pub scope: String,

    /// Expiration time as unix timestamp (seconds).
    pub exp: i64,

    /// Issued-at time as unix timestamp (seconds).
    pub iat: i64,
}

impl AccessClaims {
    /// Splits the `scope` claim into its individual scopes.
    pub fn scopes(&self) -> Vec<&str> {
        self.scope.split(' ').filter(|s| !s.is_empty()).collect()
    }
}

// =============================================================================
// Signer
// =============================================================================

/// Signs and verifies HS256 access tokens.
///
/// Create once at startup and share via `Arc`; the keys are immutable after
/// construction.
#[derive(Clone)]
pub struct JwtSigner {
    /// Key for signing tokens (kept secret)
    encoding_key: EncodingKey,
    /// Key for verifying signatures
    decoding_key: DecodingKey,
    /// Key id written into the token header
    key_id: String,
    /// Horizon of the `exp` claim
    claim_ttl: Duration,
}

impl JwtSigner {
    /// Creates a signer from the JWT configuration.
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            key_id: config.key_id.clone(),
            claim_ttl: Duration::seconds(config.claim_ttl_seconds as i64),
        }
    }

    /// Signs an access token for `user_id` carrying `scope`.
    ///
    /// ## Errors
    ///
    /// Returns `ApiError::InternalError` if encoding fails (which should not
    /// happen with a valid secret).
    pub fn sign(&self, user_id: &str, scope: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            scope: scope.to_string(),
            exp: (now + self.claim_ttl).timestamp(),
            iat: now.timestamp(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.key_id.clone());

        encode(&header, &claims, &self.encoding_key).map_err(|e| ApiError::InternalError {
            message: format!("failed to sign access token: {}", e),
        })
    }

    /// Verifies a token's signature and expiry and returns its claims.
    ///
    /// Any token whose header algorithm is not HS256, whose signature does
    /// not match, or whose `exp` has passed is rejected.
    ///
    /// ## Errors
    ///
    /// Returns `ApiError::InvalidToken` on every verification failure.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| ApiError::InvalidToken)
    }

    /// Extracts the token from an Authorization header value.
    ///
    /// Expects the format `Bearer <token>`.
    ///
    /// ## Errors
    ///
    /// Returns `ApiError::InvalidToken` if the header doesn't start with
    /// "Bearer " or the token part is empty.
    pub fn extract_from_header(auth_header: &str) -> Result<&str, ApiError> {
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::InvalidToken)?;

        if token.is_empty() {
            return Err(ApiError::InvalidToken);
        }

        Ok(token)
    }
}

// Implement Debug manually to avoid exposing keys
impl std::fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSigner")
            .field("key_id", &self.key_id)
            .field("claim_ttl", &self.claim_ttl)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test_secret_key_minimum_32_chars_required".to_string(),
            key_id: "jwt-key".to_string(),
            claim_ttl_seconds: 86400,
        }
    }

    #[test]
    fn test_sign_and_verify_round_trip() {
        let signer = JwtSigner::new(&test_config());

        let token = signer
            .sign("eb5dc850f1fb40a8b9b2bffd89c6a32d", "profile search")
            .unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.sub, "eb5dc850f1fb40a8b9b2bffd89c6a32d");
        assert_eq!(claims.scope, "profile search");
        assert_eq!(claims.scopes(), vec!["profile", "search"]);
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 86400);
    }

    #[test]
    fn test_header_carries_key_id() {
        let signer = JwtSigner::new(&test_config());
        let token = signer.sign("user", "").unwrap();

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
        assert_eq!(header.kid.as_deref(), Some("jwt-key"));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let signer = JwtSigner::new(&test_config());
        let other = JwtSigner::new(&JwtConfig {
            secret: "another_secret_key_minimum_32_chars_long".to_string(),
            key_id: "jwt-key".to_string(),
            claim_ttl_seconds: 86400,
        });

        let token = signer.sign("user", "profile").unwrap();
        assert!(matches!(other.verify(&token), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let signer = JwtSigner::new(&test_config());
        assert!(matches!(
            signer.verify("not.a.token"),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn test_empty_scope_round_trips_empty() {
        let signer = JwtSigner::new(&test_config());
        let token = signer.sign("user", "").unwrap();
        let claims = signer.verify(&token).unwrap();
        assert!(claims.scopes().is_empty());
    }

    #[test]
    fn test_extract_from_header_valid() {
        let extracted = JwtSigner::extract_from_header("Bearer abc.def.ghi").unwrap();
        assert_eq!(extracted, "abc.def.ghi");
    }

    #[test]
    fn test_extract_from_header_invalid() {
        assert!(JwtSigner::extract_from_header("Basic dXNlcjpwYXNz").is_err());
        assert!(JwtSigner::extract_from_header("Bearer ").is_err());
        assert!(JwtSigner::extract_from_header("").is_err());
    }
}
