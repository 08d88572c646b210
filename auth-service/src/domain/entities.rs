//! # Domain Entities
//!
//! Persistent business objects mapping directly to database tables, plus the
//! [`TokenBundle`] the token store serializes.
//!
//! ## Entity Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            Relational Model                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────┐ 1:N ┌───────────────────┐                            │
//! │  │  ApiClient   │────▶│  ApiClientScope   │                            │
//! │  └──────────────┘     └───────────────────┘                            │
//! │                                                                         │
//! │  ┌──────────────┐ N:M ┌────────────┐ 1:N ┌───────────────┐             │
//! │  │     User     │────▶│    Role    │────▶│   RoleScope   │             │
//! │  └──────────────┘(user└────────────┘     └───────────────┘             │
//! │                  _roles)                                                │
//! │  ┌────────────────────┐                                                 │
//! │  │  RegistrationCode  │   single-use, hard-deleted on consume           │
//! │  └────────────────────┘                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Entity | Table | Purpose |
//! |--------|-------|---------|
//! | [`ApiClient`] | `api_clients` | Registered OAuth client |
//! | [`ApiClientScope`] | `api_client_scopes` | Scope a client may request |
//! | [`User`] | `users` | Account with bcrypt password digest |
//!
//! Roles, role scopes, user-role bindings and registration codes are only
//! ever touched through scalar queries and the seeding inserts, so they
//! have no row types here; their tables live in the migrations.
//!
//! ## Security Considerations
//!
//! - **Never expose `password`**: the bcrypt digest stays server-side
//! - **Soft deletes**: audit columns on all tables except `user_roles` and
//!   `registration_codes`; the registration-code consume is a hard delete

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =============================================================================
// RELATIONAL ENTITIES
// =============================================================================

/// Registered OAuth client as stored in `api_clients`.
///
/// `domain` is the redirect-URI origin the client is registered for. The
/// client's permitted scopes live in `api_client_scopes` and are joined on
/// read.
#[derive(Debug, Clone, FromRow)]
pub struct ApiClient {
    pub id: String,
    pub secret: String,
    pub domain: String,
    pub is_public: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Scope an API client is permitted to request.
#[derive(Debug, Clone, FromRow)]
pub struct ApiClientScope {
    pub id: i32,
    pub api_client_id: String,
    pub scope: String,
}

/// Account row from `users`.
///
/// `id` is a 32-character opaque hex string (UUID with the dashes stripped),
/// `password` a bcrypt digest.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// =============================================================================
// TOKEN BUNDLE
// =============================================================================

/// The tuple the token store persists under its three index keys.
///
/// One serialized `TokenBundle` is stored under the code, access and refresh
/// keys; all three resolve to the identical JSON value. Timestamps are unix
/// seconds so the create script can compare ages numerically.
///
/// A bundle is written twice per flow: first with only `code` populated when
/// the authorization code is minted, then with `access`/`refresh` populated
/// (and `code` empty) after the exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    pub client_id: String,
    pub user_id: String,

    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub code_expires_in: i64,
    #[serde(default)]
    pub code_created_at: i64,

    #[serde(default)]
    pub access: String,
    #[serde(default)]
    pub access_expires_in: i64,
    #[serde(default)]
    pub access_created_at: i64,

    #[serde(default)]
    pub refresh: String,
    #[serde(default)]
    pub refresh_expires_in: i64,
    #[serde(default)]
    pub refresh_created_at: i64,

    #[serde(default)]
    pub scope: String,
}

impl TokenBundle {
    /// True when the authorization code has outlived its TTL at `now`
    /// (unix seconds). The in-memory store has no key expiry, so the
    /// exchange path checks this explicitly.
    pub fn code_expired(&self, now: i64) -> bool {
        !self.code.is_empty() && now >= self.code_created_at + self.code_expires_in
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_bundle_json_field_names() {
        let bundle = TokenBundle {
            client_id: "c1".to_string(),
            user_id: "u1".to_string(),
            code: "abc".to_string(),
            code_expires_in: 300,
            code_created_at: 1_700_000_000,
            scope: "profile".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&bundle).unwrap();
        // The create script reads these exact keys out of the payload.
        assert_eq!(json["client_id"], "c1");
        assert_eq!(json["access_created_at"], 0);
        assert_eq!(json["code_created_at"], 1_700_000_000_i64);
        assert_eq!(json["scope"], "profile");
    }

    #[test]
    fn test_partial_bundle_round_trips() {
        let bundle = TokenBundle {
            client_id: "c1".to_string(),
            user_id: "u1".to_string(),
            code: "abc".to_string(),
            code_expires_in: 300,
            code_created_at: 100,
            scope: "profile".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_string(&bundle).unwrap();
        let parsed: TokenBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, bundle);
    }

    #[test]
    fn test_code_expiry() {
        let bundle = TokenBundle {
            code: "abc".to_string(),
            code_expires_in: 300,
            code_created_at: 1_000,
            ..Default::default()
        };

        assert!(!bundle.code_expired(1_299));
        assert!(bundle.code_expired(1_300));
        assert!(bundle.code_expired(2_000));

        // A bundle without a code never reports expiry
        let no_code = TokenBundle::default();
        assert!(!no_code.code_expired(i64::MAX));
    }
}
