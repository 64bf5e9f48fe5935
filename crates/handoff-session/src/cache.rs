//! Distributed cache abstraction and backends.
//!
//! The session store only needs string get/set/remove with an absolute
//! expiration hint, so that is the whole contract. The in-memory backend
//! serves single-process deployments and tests; the Redis backend is for
//! distributed deployments and mirrors the platform's other Redis usage.

use crate::error::SessionResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// String-keyed, string-valued cache shared across process instances.
///
/// Implementations must honor `absolute_expiration` as a hint: entries
/// may be evicted at that instant, but callers still perform their own
/// expiry checks on top (defense-in-depth against clock skew and backend
/// TTL granularity).
#[async_trait]
pub trait DistributedCache: Send + Sync {
    /// Fetch a value, or `None` if absent or evicted.
    async fn get_string(&self, key: &str) -> SessionResult<Option<String>>;

    /// Store a value with an absolute expiration.
    async fn set_string(
        &self,
        key: &str,
        value: &str,
        absolute_expiration: DateTime<Utc>,
    ) -> SessionResult<()>;

    /// Remove a value. Removing a missing key is a no-op.
    async fn remove(&self, key: &str) -> SessionResult<()>;
}

#[cfg(feature = "memory")]
pub use memory::MemoryCache;

#[cfg(feature = "memory")]
mod memory {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    /// In-memory cache for single-process deployments and tests.
    ///
    /// Entries past their absolute expiration are dropped lazily on read.
    #[derive(Default)]
    pub struct MemoryCache {
        entries: RwLock<HashMap<String, (String, DateTime<Utc>)>>,
    }

    impl MemoryCache {
        /// Create an empty cache.
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of physically present entries, including any whose
        /// expiration has passed but which have not been read since.
        pub async fn entry_count(&self) -> usize {
            self.entries.read().await.len()
        }
    }

    #[async_trait]
    impl DistributedCache for MemoryCache {
        async fn get_string(&self, key: &str) -> SessionResult<Option<String>> {
            {
                let entries = self.entries.read().await;
                match entries.get(key) {
                    None => return Ok(None),
                    Some((value, expires)) if *expires > Utc::now() => {
                        return Ok(Some(value.clone()))
                    }
                    Some(_) => {}
                }
            }

            // Entry exists but is past its expiration; evict it.
            self.entries.write().await.remove(key);
            Ok(None)
        }

        async fn set_string(
            &self,
            key: &str,
            value: &str,
            absolute_expiration: DateTime<Utc>,
        ) -> SessionResult<()> {
            self.entries
                .write()
                .await
                .insert(key.to_string(), (value.to_string(), absolute_expiration));
            Ok(())
        }

        async fn remove(&self, key: &str) -> SessionResult<()> {
            self.entries.write().await.remove(key);
            Ok(())
        }
    }
}

#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;

#[cfg(feature = "redis")]
mod redis_cache {
    use super::*;
    use crate::error::SessionError;
    use redis::aio::MultiplexedConnection;
    use redis::{AsyncCommands, Client};

    /// Redis-backed cache for distributed deployments.
    ///
    /// Absolute expirations are translated to a TTL at write time; a
    /// value already past its expiration is not written at all.
    pub struct RedisCache {
        /// Redis client
        client: Client,
    }

    impl RedisCache {
        /// Create a new Redis cache.
        ///
        /// # Arguments
        ///
        /// * `redis_url` - Redis connection URL (e.g. `redis://localhost:6379`)
        ///
        /// # Returns
        ///
        /// A new `RedisCache` instance or a connection error
        pub async fn new(redis_url: &str) -> SessionResult<Self> {
            let client = Client::open(redis_url)
                .map_err(|e| SessionError::ConnectionError(e.to_string()))?;

            // Test connection
            let _ = client
                .get_multiplexed_async_connection()
                .await
                .map_err(|e| SessionError::ConnectionError(e.to_string()))?;

            Ok(Self { client })
        }

        async fn get_connection(&self) -> SessionResult<MultiplexedConnection> {
            self.client
                .get_multiplexed_async_connection()
                .await
                .map_err(|e| SessionError::ConnectionError(e.to_string()))
        }
    }

    #[async_trait]
    impl DistributedCache for RedisCache {
        async fn get_string(&self, key: &str) -> SessionResult<Option<String>> {
            let mut conn = self.get_connection().await?;
            let value: Option<String> = conn
                .get(key)
                .await
                .map_err(|e| SessionError::CacheError(e.to_string()))?;
            Ok(value)
        }

        async fn set_string(
            &self,
            key: &str,
            value: &str,
            absolute_expiration: DateTime<Utc>,
        ) -> SessionResult<()> {
            let ttl = (absolute_expiration - Utc::now()).num_seconds();
            if ttl <= 0 {
                // Already expired; storing it would only create garbage.
                return Ok(());
            }

            let mut conn = self.get_connection().await?;
            conn.set_ex::<_, _, ()>(key, value, ttl as usize)
                .await
                .map_err(|e| SessionError::CacheError(e.to_string()))?;
            Ok(())
        }

        async fn remove(&self, key: &str) -> SessionResult<()> {
            let mut conn = self.get_connection().await?;
            conn.del::<_, ()>(key)
                .await
                .map_err(|e| SessionError::CacheError(e.to_string()))?;
            Ok(())
        }
    }
}
