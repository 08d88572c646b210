//! # Redis Client
//!
//! Thin async Redis client used by the token store.
//!
//! ## Connection Management
//!
//! We use a `ConnectionManager` which automatically reconnects on failure.
//! This is more resilient than a plain connection for long-running services.
//!
//! ## Key Naming Convention
//!
//! The token store owns the keyspace:
//!
//! | Pattern | Purpose |
//! |---------|---------|
//! | `code:{user_id}:{code}` | Authorization-code index |
//! | `access:{user_id}:{access}` | Access-token index |
//! | `refresh:{user_id}:{refresh}` | Refresh-token index |
//! | `SHA:createScript` | SHA of the loaded create script |
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::redis_client::RedisClient;
//!
//! let redis = RedisClient::new(&config.redis).await?;
//! redis.ping().await?;
//! let mut conn = redis.manager();
//! // issue commands on `conn` with redis::cmd / AsyncCommands
//! ```

use crate::config::RedisConfig;
use crate::errors::ApiError;
use redis::aio::ConnectionManager;
use tracing::info;

/// Async Redis client with automatic reconnection.
///
/// Safe to clone and share across tasks; cloning is an `Arc` clone of the
/// underlying manager.
#[derive(Clone)]
pub struct RedisClient {
    /// Connection manager for automatic reconnection
    conn: ConnectionManager,
}

impl RedisClient {
    /// Creates a new Redis client and establishes the connection.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RedisError` if the URL is invalid, the server is
    /// unreachable, or authentication fails.
    pub async fn new(config: &RedisConfig) -> Result<Self, ApiError> {
        info!(url = %config.url, "Connecting to Redis");

        let client = redis::Client::open(config.url.as_str()).map_err(ApiError::RedisError)?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(ApiError::RedisError)?;

        info!("Redis connection established");

        Ok(Self { conn })
    }

    /// Hands out a clone of the connection manager for issuing commands.
    pub fn manager(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Health check - verifies Redis is responding.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(ApiError::RedisError)?;
        Ok(())
    }
}

// Hide internal state in Debug output
impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient").finish_non_exhaustive()
    }
}
