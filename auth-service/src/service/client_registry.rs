//! # Client Registry
//!
//! In-memory view of the registered API clients, loaded once at startup.
//!
//! Clients are created at bootstrap and never mutated by the running
//! server, so a startup snapshot is sufficient and keeps the authorize and
//! token paths off the database for client lookups. Each entry carries the
//! client's permitted scopes space-joined, mirroring how the scope claim is
//! transported elsewhere.

use shared::errors::ApiError;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::repository::ClientRepository;

/// A registered client with its scopes materialized.
#[derive(Debug, Clone)]
pub struct RegisteredClient {
    pub id: String,
    pub secret: String,
    /// Redirect-URI origin the client is registered for.
    pub domain: String,
    /// Space-joined permitted scopes.
    pub scopes: String,
}

/// Startup-loaded client map.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, RegisteredClient>,
}

impl ClientRegistry {
    /// Loads all clients and their scopes from the database.
    ///
    /// Fails with "no clients found" when the table is empty: a server
    /// without a single registered client cannot serve any flow, and the
    /// operator should seed one (see the bootstrap step).
    pub async fn initialize(repo: &ClientRepository) -> Result<Self, ApiError> {
        let rows = repo.load_all().await?;
        if rows.is_empty() {
            return Err(ApiError::InternalError {
                message: "no clients found".to_string(),
            });
        }

        let mut scopes_by_client = repo.load_scopes().await?;

        let mut clients = HashMap::new();
        for row in rows {
            let scopes = scopes_by_client
                .remove(&row.id)
                .map(|list| list.join(" "))
                .unwrap_or_default();

            debug!(
                client_id = %row.id,
                domain = %row.domain,
                public = row.is_public,
                scopes = %scopes,
                "Registered client"
            );

            clients.insert(
                row.id.clone(),
                RegisteredClient {
                    id: row.id,
                    secret: row.secret,
                    domain: row.domain,
                    scopes,
                },
            );
        }

        info!(count = clients.len(), "Client registry loaded");

        Ok(Self { clients })
    }

    /// Looks up a client by id.
    pub fn get(&self, client_id: &str) -> Option<&RegisteredClient> {
        self.clients.get(client_id)
    }

    #[cfg(test)]
    pub fn with_clients(clients: Vec<RegisteredClient>) -> Self {
        Self {
            clients: clients.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: &str, scopes: &str) -> RegisteredClient {
        RegisteredClient {
            id: id.to_string(),
            secret: "secret".to_string(),
            domain: "http://localhost:3000".to_string(),
            scopes: scopes.to_string(),
        }
    }

    #[test]
    fn test_lookup() {
        let registry =
            ClientRegistry::with_clients(vec![client("c1", "profile search"), client("c2", "admin")]);

        assert_eq!(registry.get("c1").unwrap().scopes, "profile search");
        assert_eq!(registry.get("c2").unwrap().scopes, "admin");
        assert!(registry.get("missing").is_none());
    }
}
