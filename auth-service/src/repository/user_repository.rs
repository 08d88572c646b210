//! # User Repository
//!
//! Data access for user rows and the user-side scope join.
//!
//! ## Query Patterns
//!
//! | Pattern | Example |
//! |---------|---------|
//! | Soft delete | `WHERE deleted_at IS NULL` |
//! | Parameterized | Always `$1`, `$2` (never string interpolation) |
//!
//! The effective-scope query joins `user_roles` to `role_scopes`: a user's
//! scopes are the union of the scopes of every role bound to them.

use shared::errors::ApiError;
use sqlx::PgPool;

use crate::domain::User;

/// Repository for user-related database operations.
///
/// `Send + Sync` because `PgPool` is `Arc`-based; cloning is cheap.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a user by email address.
    ///
    /// Only returns non-deleted users. `None` when the email is unknown.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE email = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by their 32-character id.
    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// The user's effective scopes: the distinct union across all roles
    /// bound to them. Empty when the user has no roles or no role carries a
    /// scope.
    pub async fn effective_scopes(&self, user_id: &str) -> Result<Vec<String>, ApiError> {
        let scopes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT role_scopes.scope
            FROM role_scopes
            INNER JOIN (
                SELECT user_id, role_id FROM user_roles WHERE user_id = $1
            ) AS ur ON role_scopes.role_id = ur.role_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(scopes)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    // Exercised end to end by the registration and scope-authority tests,
    // which need a local Postgres and run with:
    //
    //   cargo test -- --ignored
}
