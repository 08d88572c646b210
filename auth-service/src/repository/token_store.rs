//! # Token Store
//!
//! Persistence for issued [`TokenBundle`]s under three lookup paths: the
//! authorization code, the access token and the refresh token. All three
//! index keys resolve to the same serialized bundle.
//!
//! Two implementations share the [`TokenStore`] trait:
//!
//! | Implementation | Backing | Cap | Expiry |
//! |----------------|---------|-----|--------|
//! | [`MemoryTokenStore`] | mutex-guarded map | none | checked by callers |
//! | [`RedisTokenStore`] | Redis | per-user, atomic | key TTLs |
//!
//! ## Capped creates
//!
//! Counting a user's live access keys and then writing the new bundle can't
//! be done race-free with client-side commands, so the Redis store runs the
//! whole create as a server-side Lua script (`create_token.lua`). The script
//! evicts the bundle with the oldest `access_created_at` once the user is at
//! the cap, then writes the three keys with their TTLs.
//!
//! ## Script lifecycle
//!
//! The SHA of the loaded script is published under `SHA:createScript`:
//!
//! 1. `GET SHA:createScript`; if present, `SCRIPT EXISTS` to survive a
//!    server restart or `SCRIPT FLUSH`
//! 2. present and loaded: `EVALSHA`
//! 3. otherwise `SCRIPT LOAD`, then one `MULTI`/`EXEC` pipeline that both
//!    `SET`s the SHA key and runs the first `EVALSHA`, so two concurrent
//!    first callers can never publish different SHAs
//!
//! A lost race between the existence check and the `EVALSHA` only re-loads
//! identical script text, which is harmless.
//!
//! ## Lookups
//!
//! The user id sits in the middle of the key (`access:<user>:<value>`) and
//! callers only hold the value, so gets and removes scan with
//! `KEYS <prefix>:*:<value>`. Exactly one key matches; zero matches means
//! the token is invalid. With a large keyspace this should move to a
//! secondary index per user.

use async_trait::async_trait;
use redis::AsyncCommands;
use shared::errors::ApiError;
use shared::redis_client::RedisClient;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::TokenBundle;

/// Well-known key holding the SHA of the loaded create script.
const SCRIPT_SHA_KEY: &str = "SHA:createScript";

/// Server-side create script, loaded into Redis on first use.
const CREATE_SCRIPT: &str = include_str!("create_token.lua");

/// Index-key prefixes.
const PREFIX_CODE: &str = "code";
const PREFIX_ACCESS: &str = "access";
const PREFIX_REFRESH: &str = "refresh";

// =============================================================================
// TRAIT
// =============================================================================

/// Storage contract for issued token bundles.
///
/// Misses are reported as `ApiError::InvalidToken`; transport and
/// serialization failures surface as server errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persists a bundle under its populated index keys. Capped
    /// implementations enforce the per-user bound atomically.
    async fn create(&self, bundle: &TokenBundle) -> Result<(), ApiError>;

    async fn get_by_code(&self, code: &str) -> Result<TokenBundle, ApiError>;
    async fn get_by_access(&self, access: &str) -> Result<TokenBundle, ApiError>;
    async fn get_by_refresh(&self, refresh: &str) -> Result<TokenBundle, ApiError>;

    async fn remove_by_code(&self, code: &str) -> Result<(), ApiError>;
    async fn remove_by_access(&self, access: &str) -> Result<(), ApiError>;
    async fn remove_by_refresh(&self, refresh: &str) -> Result<(), ApiError>;
}

fn serialize_bundle(bundle: &TokenBundle) -> Result<String, ApiError> {
    serde_json::to_string(bundle).map_err(|e| ApiError::InternalError {
        message: format!("failed to serialize token bundle: {}", e),
    })
}

fn deserialize_bundle(raw: &str) -> Result<TokenBundle, ApiError> {
    serde_json::from_str(raw).map_err(|e| ApiError::InternalError {
        message: format!("failed to deserialize token bundle: {}", e),
    })
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Unbounded in-memory store keyed `"<prefix>:<value>"`.
///
/// The map is mutex-guarded; nothing awaits while the lock is held. Bundles
/// do not expire on their own - the exchange path checks code expiry from
/// the bundle timestamps.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(prefix: &str, value: &str) -> String {
        format!("{}:{}", prefix, value)
    }

    fn get(&self, prefix: &str, value: &str) -> Result<TokenBundle, ApiError> {
        let entries = self.entries.lock().expect("token store mutex poisoned");
        let raw = entries
            .get(&Self::key(prefix, value))
            .ok_or(ApiError::InvalidToken)?;
        deserialize_bundle(raw)
    }

    fn remove(&self, prefix: &str, value: &str) -> Result<(), ApiError> {
        let mut entries = self.entries.lock().expect("token store mutex poisoned");
        entries
            .remove(&Self::key(prefix, value))
            .map(|_| ())
            .ok_or(ApiError::InvalidToken)
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn create(&self, bundle: &TokenBundle) -> Result<(), ApiError> {
        let payload = serialize_bundle(bundle)?;

        let mut entries = self.entries.lock().expect("token store mutex poisoned");
        if !bundle.code.is_empty() {
            entries.insert(Self::key(PREFIX_CODE, &bundle.code), payload.clone());
        }
        if !bundle.access.is_empty() {
            entries.insert(Self::key(PREFIX_ACCESS, &bundle.access), payload.clone());
        }
        if !bundle.refresh.is_empty() {
            entries.insert(Self::key(PREFIX_REFRESH, &bundle.refresh), payload);
        }
        Ok(())
    }

    async fn get_by_code(&self, code: &str) -> Result<TokenBundle, ApiError> {
        self.get(PREFIX_CODE, code)
    }

    async fn get_by_access(&self, access: &str) -> Result<TokenBundle, ApiError> {
        self.get(PREFIX_ACCESS, access)
    }

    async fn get_by_refresh(&self, refresh: &str) -> Result<TokenBundle, ApiError> {
        self.get(PREFIX_REFRESH, refresh)
    }

    async fn remove_by_code(&self, code: &str) -> Result<(), ApiError> {
        self.remove(PREFIX_CODE, code)
    }

    async fn remove_by_access(&self, access: &str) -> Result<(), ApiError> {
        self.remove(PREFIX_ACCESS, access)
    }

    async fn remove_by_refresh(&self, refresh: &str) -> Result<(), ApiError> {
        self.remove(PREFIX_REFRESH, refresh)
    }
}

// =============================================================================
// REDIS STORE
// =============================================================================

/// Redis-backed store with the optional per-user cap.
///
/// Key layout: `code:<user>:<code>`, `access:<user>:<access>`,
/// `refresh:<user>:<refresh>`, each with the TTL taken from the bundle's
/// `*_expires_in`.
pub struct RedisTokenStore {
    redis: RedisClient,
    /// Cap handed to the create script; 0 disables eviction.
    max_num_keys: u32,
}

impl RedisTokenStore {
    pub fn new(redis: RedisClient, max_num_keys: u32) -> Self {
        Self {
            redis,
            max_num_keys,
        }
    }

    /// Runs the create script through the SHA publish/reuse protocol.
    async fn run_create_script(&self, argv: &[String]) -> Result<String, ApiError> {
        let mut conn = self.redis.manager();

        let published_sha: Option<String> = conn.get(SCRIPT_SHA_KEY).await?;

        let loaded_sha = match published_sha {
            Some(sha) => {
                // The SHA key may outlive the script cache (server restart
                // or SCRIPT FLUSH), so confirm before EVALSHA.
                let exists: Vec<bool> = redis::cmd("SCRIPT")
                    .arg("EXISTS")
                    .arg(&sha)
                    .query_async(&mut conn)
                    .await?;
                exists.first().copied().unwrap_or(false).then_some(sha)
            }
            None => None,
        };

        if let Some(sha) = loaded_sha {
            let mut cmd = redis::cmd("EVALSHA");
            cmd.arg(&sha).arg(0);
            for arg in argv {
                cmd.arg(arg);
            }
            let reply: String = cmd.query_async(&mut conn).await?;
            return Ok(reply);
        }

        let sha: String = redis::cmd("SCRIPT")
            .arg("LOAD")
            .arg(CREATE_SCRIPT)
            .query_async(&mut conn)
            .await?;

        // Publish the SHA and run the script in one MULTI/EXEC block so two
        // concurrent first callers cannot publish different SHAs.
        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.cmd("SET").arg(SCRIPT_SHA_KEY).arg(&sha).ignore();
        {
            let cmd = pipe.cmd("EVALSHA").arg(&sha).arg(0);
            for arg in argv {
                cmd.arg(arg);
            }
        }
        let (reply,): (String,) = pipe.query_async(&mut conn).await?;
        Ok(reply)
    }

    async fn get_by_pattern(&self, prefix: &str, value: &str) -> Result<TokenBundle, ApiError> {
        let mut conn = self.redis.manager();

        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(format!("{}:*:{}", prefix, value))
            .query_async(&mut conn)
            .await?;

        // exactly one key matches; zero means the token is unknown
        let key = keys.first().ok_or(ApiError::InvalidToken)?;

        let raw: Option<String> = conn.get(key).await?;
        let raw = raw.ok_or(ApiError::InvalidToken)?;
        deserialize_bundle(&raw)
    }

    async fn remove_by_pattern(&self, prefix: &str, value: &str) -> Result<(), ApiError> {
        let mut conn = self.redis.manager();

        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(format!("{}:*:{}", prefix, value))
            .query_async(&mut conn)
            .await?;

        let key = keys.first().ok_or(ApiError::InvalidToken)?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn create(&self, bundle: &TokenBundle) -> Result<(), ApiError> {
        let payload = serialize_bundle(bundle)?;

        let argv = [
            bundle.user_id.clone(),
            self.max_num_keys.to_string(),
            bundle.code.clone(),
            bundle.access.clone(),
            bundle.refresh.clone(),
            bundle.code_expires_in.to_string(),
            bundle.access_expires_in.to_string(),
            bundle.refresh_expires_in.to_string(),
            payload,
        ];

        let reply = self.run_create_script(&argv).await?;
        if reply != "SUCCESS" {
            return Err(ApiError::InternalError {
                message: format!("token create script replied: {}", reply),
            });
        }
        Ok(())
    }

    async fn get_by_code(&self, code: &str) -> Result<TokenBundle, ApiError> {
        self.get_by_pattern(PREFIX_CODE, code).await
    }

    async fn get_by_access(&self, access: &str) -> Result<TokenBundle, ApiError> {
        self.get_by_pattern(PREFIX_ACCESS, access).await
    }

    async fn get_by_refresh(&self, refresh: &str) -> Result<TokenBundle, ApiError> {
        self.get_by_pattern(PREFIX_REFRESH, refresh).await
    }

    async fn remove_by_code(&self, code: &str) -> Result<(), ApiError> {
        self.remove_by_pattern(PREFIX_CODE, code).await
    }

    async fn remove_by_access(&self, access: &str) -> Result<(), ApiError> {
        self.remove_by_pattern(PREFIX_ACCESS, access).await
    }

    async fn remove_by_refresh(&self, refresh: &str) -> Result<(), ApiError> {
        self.remove_by_pattern(PREFIX_REFRESH, refresh).await
    }
}

impl std::fmt::Debug for RedisTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTokenStore")
            .field("max_num_keys", &self.max_num_keys)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bundle(user: &str, code: &str, access: &str, refresh: &str) -> TokenBundle {
        let now = Utc::now().timestamp();
        TokenBundle {
            client_id: "client-1".to_string(),
            user_id: user.to_string(),
            code: code.to_string(),
            code_expires_in: 300,
            code_created_at: now,
            access: access.to_string(),
            access_expires_in: 3600,
            access_created_at: now,
            refresh: refresh.to_string(),
            refresh_expires_in: 86400,
            refresh_created_at: now,
            scope: "profile".to_string(),
        }
    }

    #[actix_web::test]
    async fn test_memory_create_and_get_by_all_keys() {
        let store = MemoryTokenStore::new();
        let b = bundle("u1", "code-1", "access-1", "refresh-1");

        store.create(&b).await.unwrap();

        assert_eq!(store.get_by_code("code-1").await.unwrap(), b);
        assert_eq!(store.get_by_access("access-1").await.unwrap(), b);
        assert_eq!(store.get_by_refresh("refresh-1").await.unwrap(), b);
    }

    #[actix_web::test]
    async fn test_memory_missing_keys_are_invalid() {
        let store = MemoryTokenStore::new();

        assert!(matches!(
            store.get_by_code("nope").await,
            Err(ApiError::InvalidToken)
        ));
        assert!(matches!(
            store.get_by_access("nope").await,
            Err(ApiError::InvalidToken)
        ));
        assert!(matches!(
            store.remove_by_refresh("nope").await,
            Err(ApiError::InvalidToken)
        ));
    }

    #[actix_web::test]
    async fn test_memory_remove_clears_only_that_index() {
        let store = MemoryTokenStore::new();
        let b = bundle("u1", "code-1", "access-1", "refresh-1");
        store.create(&b).await.unwrap();

        store.remove_by_code("code-1").await.unwrap();
        assert!(store.get_by_code("code-1").await.is_err());
        // the other indexes still resolve
        assert!(store.get_by_access("access-1").await.is_ok());
        assert!(store.get_by_refresh("refresh-1").await.is_ok());
    }

    #[actix_web::test]
    async fn test_memory_code_only_bundle_writes_one_key() {
        let store = MemoryTokenStore::new();
        let b = TokenBundle {
            client_id: "client-1".to_string(),
            user_id: "u1".to_string(),
            code: "code-1".to_string(),
            code_expires_in: 300,
            code_created_at: Utc::now().timestamp(),
            scope: "profile".to_string(),
            ..Default::default()
        };

        store.create(&b).await.unwrap();

        assert!(store.get_by_code("code-1").await.is_ok());
        assert!(store.get_by_access("").await.is_err());
        assert!(store.get_by_refresh("").await.is_err());
    }

    // Redis-backed tests need a local Redis; run them with
    //   cargo test -- --ignored
    // The script cache persists between runs - SCRIPT FLUSH in redis-cli to
    // exercise the reload path.
    mod redis_backed {
        use super::*;
        use shared::config::RedisConfig;

        async fn store(max_keys: u32) -> RedisTokenStore {
            let redis = RedisClient::new(&RedisConfig {
                url: "redis://localhost:6379".to_string(),
            })
            .await
            .expect("local redis required");
            RedisTokenStore::new(redis, max_keys)
        }

        #[actix_web::test]
        #[ignore]
        async fn test_redis_create_get_remove_round_trip() {
            let store = store(0).await;
            let b = bundle("it-user-1", "it-code-1", "it-access-1", "it-refresh-1");

            store.create(&b).await.unwrap();

            assert_eq!(store.get_by_code("it-code-1").await.unwrap(), b);
            assert_eq!(store.get_by_access("it-access-1").await.unwrap(), b);
            assert_eq!(store.get_by_refresh("it-refresh-1").await.unwrap(), b);

            store.remove_by_code("it-code-1").await.unwrap();
            store.remove_by_access("it-access-1").await.unwrap();
            store.remove_by_refresh("it-refresh-1").await.unwrap();

            assert!(store.get_by_code("it-code-1").await.is_err());
            assert!(store.get_by_access("it-access-1").await.is_err());
            assert!(store.get_by_refresh("it-refresh-1").await.is_err());
        }

        #[actix_web::test]
        #[ignore]
        async fn test_redis_cap_evicts_oldest_bundle() {
            let store = store(2).await;

            let mut bundles = Vec::new();
            for i in 0..3 {
                let mut b = bundle(
                    "it-user-cap",
                    "",
                    &format!("it-access-cap-{}", i),
                    &format!("it-refresh-cap-{}", i),
                );
                // strictly increasing ages so the eviction order is fixed
                b.access_created_at += i;
                store.create(&b).await.unwrap();
                bundles.push(b);
            }

            // oldest bundle is gone under all of its keys
            assert!(store.get_by_access("it-access-cap-0").await.is_err());
            assert!(store.get_by_refresh("it-refresh-cap-0").await.is_err());

            // the two newest survive
            assert!(store.get_by_access("it-access-cap-1").await.is_ok());
            assert!(store.get_by_access("it-access-cap-2").await.is_ok());

            for b in &bundles[1..] {
                store.remove_by_access(&b.access).await.ok();
                store.remove_by_refresh(&b.refresh).await.ok();
            }
        }
    }
}
