//! # Token Verifier
//!
//! Bearer-token guard for protected routes.
//!
//! ## Admission Steps
//!
//! 1. Extract the token from `Authorization: Bearer ...`; missing or
//!    malformed ⇒ 401
//! 2. Verify the HS256 signature and expiry; a token signed with any other
//!    algorithm is rejected
//! 3. Require the token to resolve in the token store - a signed token that
//!    was evicted or removed is no longer valid
//! 4. Require every route-declared scope to be present in the `scope`
//!    claim; the first missing one is reported ⇒ 403
//!
//! Handlers call [`TokenVerifier::verify`] first and only proceed on `Ok`.

use shared::auth::{AccessClaims, JwtSigner};
use shared::errors::ApiError;
use std::collections::HashSet;
use std::sync::Arc;

use crate::repository::TokenStore;

/// Scope-gated admission for bearer tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    signer: Arc<JwtSigner>,
    token_store: Arc<dyn TokenStore>,
}

impl TokenVerifier {
    pub fn new(signer: Arc<JwtSigner>, token_store: Arc<dyn TokenStore>) -> Self {
        Self {
            signer,
            token_store,
        }
    }

    /// Verifies the Authorization header value against `required_scopes`.
    ///
    /// Returns the token's claims for the handler to use (e.g. `sub`).
    ///
    /// ## Errors
    ///
    /// - `ApiError::InvalidToken` (401) - missing header, bad signature,
    ///   expired, or not present in the token store
    /// - `ApiError::MissingScope` (403) - a required scope is absent
    pub async fn verify(
        &self,
        auth_header: Option<&str>,
        required_scopes: &[&str],
    ) -> Result<AccessClaims, ApiError> {
        let header = auth_header.ok_or(ApiError::InvalidToken)?;
        let token = JwtSigner::extract_from_header(header)?;

        let claims = self.signer.verify(token)?;

        // a structurally valid token must still be live in the store
        self.token_store.get_by_access(token).await?;

        let granted: HashSet<&str> = claims.scopes().into_iter().collect();
        for required in required_scopes {
            if !granted.contains(required) {
                return Err(ApiError::MissingScope {
                    scope: required.to_string(),
                });
            }
        }

        Ok(claims)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TokenBundle;
    use crate::repository::token_store::MockTokenStore;
    use shared::config::JwtConfig;

    fn signer() -> Arc<JwtSigner> {
        Arc::new(JwtSigner::new(&JwtConfig {
            secret: "test_secret_key_minimum_32_chars_required".to_string(),
            key_id: "jwt-key".to_string(),
            claim_ttl_seconds: 86400,
        }))
    }

    fn store_resolving(times: usize) -> Arc<MockTokenStore> {
        let mut store = MockTokenStore::new();
        store
            .expect_get_by_access()
            .times(times)
            .returning(|_| Ok(TokenBundle::default()));
        Arc::new(store)
    }

    fn store_missing() -> Arc<MockTokenStore> {
        let mut store = MockTokenStore::new();
        store
            .expect_get_by_access()
            .returning(|_| Err(ApiError::InvalidToken));
        Arc::new(store)
    }

    #[actix_web::test]
    async fn test_verify_accepts_token_with_required_scopes() {
        let signer = signer();
        let token = signer.sign("user-1", "profile admin").unwrap();
        let verifier = TokenVerifier::new(signer, store_resolving(1));

        let claims = verifier
            .verify(Some(&format!("Bearer {}", token)), &["admin"])
            .await
            .unwrap();

        assert_eq!(claims.sub, "user-1");
    }

    #[actix_web::test]
    async fn test_verify_rejects_missing_header() {
        let verifier = TokenVerifier::new(signer(), store_resolving(0));

        assert!(matches!(
            verifier.verify(None, &["admin"]).await,
            Err(ApiError::InvalidToken)
        ));
        assert!(matches!(
            verifier.verify(Some("Basic abc"), &["admin"]).await,
            Err(ApiError::InvalidToken)
        ));
    }

    #[actix_web::test]
    async fn test_verify_rejects_bad_signature() {
        let other_signer = JwtSigner::new(&JwtConfig {
            secret: "another_secret_key_minimum_32_chars_long".to_string(),
            key_id: "jwt-key".to_string(),
            claim_ttl_seconds: 86400,
        });
        let token = other_signer.sign("user-1", "admin").unwrap();

        let verifier = TokenVerifier::new(signer(), store_resolving(0));
        assert!(matches!(
            verifier
                .verify(Some(&format!("Bearer {}", token)), &["admin"])
                .await,
            Err(ApiError::InvalidToken)
        ));
    }

    #[actix_web::test]
    async fn test_verify_rejects_token_missing_from_store() {
        let signer = signer();
        let token = signer.sign("user-1", "admin").unwrap();
        let verifier = TokenVerifier::new(signer, store_missing());

        assert!(matches!(
            verifier
                .verify(Some(&format!("Bearer {}", token)), &["admin"])
                .await,
            Err(ApiError::InvalidToken)
        ));
    }

    #[actix_web::test]
    async fn test_verify_rejects_insufficient_scope() {
        let signer = signer();
        let token = signer.sign("user-1", "profile search").unwrap();
        let verifier = TokenVerifier::new(signer, store_resolving(1));

        let err = verifier
            .verify(Some(&format!("Bearer {}", token)), &["admin"])
            .await
            .unwrap_err();

        match err {
            ApiError::MissingScope { scope } => assert_eq!(scope, "admin"),
            other => panic!("expected MissingScope, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn test_verify_requires_every_scope() {
        let signer = signer();
        let token = signer.sign("user-1", "profile").unwrap();
        let verifier = TokenVerifier::new(signer, store_resolving(1));

        let err = verifier
            .verify(Some(&format!("Bearer {}", token)), &["profile", "admin"])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::MissingScope { .. }));
    }

    #[actix_web::test]
    async fn test_verify_with_no_required_scopes_only_checks_liveness() {
        let signer = signer();
        let token = signer.sign("user-1", "").unwrap();
        let verifier = TokenVerifier::new(signer, store_resolving(1));

        assert!(verifier
            .verify(Some(&format!("Bearer {}", token)), &[])
            .await
            .is_ok());
    }
}
