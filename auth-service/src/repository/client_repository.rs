//! # Client Repository
//!
//! Data access for API clients and their permitted scopes.

use shared::errors::ApiError;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::domain::{ApiClient, ApiClientScope};

/// Repository for API client reads.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads every non-deleted API client.
    pub async fn load_all(&self) -> Result<Vec<ApiClient>, ApiError> {
        let clients = sqlx::query_as::<_, ApiClient>(
            r#"
            SELECT * FROM api_clients
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    /// Loads all client scopes grouped by client id.
    pub async fn load_scopes(&self) -> Result<HashMap<String, Vec<String>>, ApiError> {
        let rows = sqlx::query_as::<_, ApiClientScope>(
            r#"
            SELECT id, api_client_id, scope FROM api_client_scopes
            WHERE deleted_at IS NULL
            ORDER BY api_client_id, scope
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            grouped.entry(row.api_client_id).or_default().push(row.scope);
        }

        Ok(grouped)
    }

    /// The client's permitted scopes. Empty when the client is unknown or
    /// has none registered.
    pub async fn permitted_scopes(&self, api_client_id: &str) -> Result<Vec<String>, ApiError> {
        let scopes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT api_client_scopes.scope
            FROM api_clients
            INNER JOIN api_client_scopes ON api_clients.id = api_client_scopes.api_client_id
            WHERE api_client_id = $1
            "#,
        )
        .bind(api_client_id)
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
    // Exercised by the scope-authority and client-registry tests against a
    // local Postgres (cargo test -- --ignored).
}
