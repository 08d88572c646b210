//! # Registration Repository
//!
//! Data access for registration codes and the transactional
//! consume-and-create that turns a code into a user account.

use shared::errors::ApiError;
use sqlx::PgPool;

/// Postgres error code for unique-constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Repository for the registration pipeline.
#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a freshly generated code.
    ///
    /// Returns `Ok(false)` when the code already exists (unique-key
    /// violation) so the caller can retry with a new one; every other
    /// database failure surfaces as an error.
    pub async fn insert_code(&self, code: &str) -> Result<bool, ApiError> {
        let result = sqlx::query(
            r#"
            INSERT INTO registration_codes (code) VALUES ($1)
            "#,
        )
        .bind(code)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Ok(false)
            }
            Err(e) => Err(ApiError::DatabaseError(e)),
        }
    }

    /// Consumes `code` and creates the user plus their default role binding,
    /// all in one transaction.
    ///
    /// The hard `DELETE ... WHERE code = $1` must affect exactly one row;
    /// two concurrent registrations with the same code serialize on that
    /// row, so exactly one of them proceeds and the other aborts with
    /// "registration code not found". No explicit locking is needed.
    pub async fn consume_code_and_create_user(
        &self,
        code: &str,
        user_id: &str,
        email: &str,
        password_digest: &str,
        role_id: i32,
    ) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM registration_codes WHERE code = $1
            "#,
        )
        .bind(code)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(ApiError::InternalError {
                message: "registration code not found".to_string(),
            });
        }

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password, is_active)
            VALUES ($1, $2, $3, TRUE)
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(password_digest)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    // Exercised by the registration-manager tests against a local Postgres
    // (cargo test -- --ignored), including the concurrent consume race.
}
