//! # Access Token Generation
//!
//! Produces the signed access token during the code-for-token exchange, and
//! the opaque refresh tokens that accompany it.
//!
//! The generator is the enforcement point for scope policy: the scope
//! authority must approve the requested scope for the (client, user) pair
//! before anything is signed, and the approved scope is bound verbatim into
//! the token's `scope` claim. An empty requested scope stays empty - it is
//! not widened to the client's full scope set.

use rand::rngs::OsRng;
use rand::RngCore;
use shared::auth::JwtSigner;
use shared::errors::ApiError;
use std::sync::Arc;

use crate::service::ScopeAuthority;

/// Length in bytes of the random material behind refresh tokens.
const OPAQUE_TOKEN_BYTES: usize = 32;

/// Signs access tokens after scope authorization.
#[derive(Debug, Clone)]
pub struct AccessTokenGenerator {
    signer: Arc<JwtSigner>,
    scope_authority: ScopeAuthority,
}

impl AccessTokenGenerator {
    pub fn new(signer: Arc<JwtSigner>, scope_authority: ScopeAuthority) -> Self {
        Self {
            signer,
            scope_authority,
        }
    }

    /// Authorizes `requested_scope` for the pair and signs the access token.
    ///
    /// Claims: `{sub: user_id, scope: requested_scope, iat: now,
    /// exp: now + 24h}`, HS256 with the configured key id.
    ///
    /// ## Errors
    ///
    /// - `ApiError::InvalidScopeRequest` when the scope authority denies
    /// - server errors from the database or the signer
    pub async fn generate(
        &self,
        api_client_id: &str,
        user_id: &str,
        requested_scope: &str,
    ) -> Result<String, ApiError> {
        self.scope_authority
            .authorize_scope(api_client_id, user_id, requested_scope)
            .await?;

        self.signer.sign(user_id, requested_scope)
    }
}

/// A 64-char hex token from 32 bytes of OS randomness.
///
/// Used for refresh tokens and authorization codes; these are bearer
/// secrets looked up in the token store, not signed artifacts.
pub fn opaque_token() -> Result<String, ApiError> {
    let mut bytes = [0u8; OPAQUE_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| ApiError::InternalError {
            message: format!("failed to generate random token: {}", e),
        })?;
    Ok(hex::encode(bytes))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_token_shape() {
        let token = opaque_token().unwrap();
        assert_eq!(token.len(), OPAQUE_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_opaque_tokens_are_unique() {
        let first = opaque_token().unwrap();
        let second = opaque_token().unwrap();
        assert_ne!(first, second);
    }

    // generate() composes the scope authority (its own Postgres-backed
    // matrix test) with the shared JwtSigner (claim-shape tests there); the
    // exchange tests in service::oauth cover the wiring.
}
