//! TTL-bound session storage.
//!
//! Sessions live in the distributed cache under a high-entropy random
//! key. The backend evicts entries at their absolute expiration, and
//! retrieval re-checks `expires` on top so a session is never served
//! past its lifetime even if backend eviction lags.

use crate::cache::DistributedCache;
use crate::data::SessionData;
use crate::error::{SessionError, SessionResult};
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Length of generated session keys in characters.
const SESSION_KEY_LENGTH: usize = 64;

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct SessionStoreConfig {
    /// Prefix for all cache keys, namespacing sessions away from other
    /// cache users.
    pub key_prefix: String,

    /// Session lifetime in minutes, applied by [`SessionStore::new_session`].
    pub session_timeout_minutes: i64,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            key_prefix: "handoff:session:".to_string(),
            session_timeout_minutes: 10,
        }
    }
}

/// Store for handoff sessions.
///
/// Session keys are unique per creation and each session is owned by the
/// client that created it, so no cross-instance locking exists: concurrent
/// reads are safe and concurrent invalidations are idempotent.
///
/// # Example
///
/// ```rust
/// use handoff_session::{MemoryCache, SessionStore, SessionStoreConfig};
/// use std::sync::Arc;
/// use uuid::Uuid;
///
/// # async fn example() {
/// let store = SessionStore::new(Arc::new(MemoryCache::new()), SessionStoreConfig::default());
///
/// let data = store.new_session("acme", Uuid::new_v4(), "https://app.acme.example/callback");
/// let key = store.create(&data).await.unwrap();
///
/// let retrieved = store.retrieve(&key).await.unwrap();
/// assert_eq!(retrieved, Some(data));
///
/// store.invalidate(&key).await.unwrap();
/// assert_eq!(store.retrieve(&key).await.unwrap(), None);
/// # }
/// ```
pub struct SessionStore {
    cache: Arc<dyn DistributedCache>,
    config: SessionStoreConfig,
}

impl SessionStore {
    /// Create a store over the given cache backend.
    pub fn new(cache: Arc<dyn DistributedCache>, config: SessionStoreConfig) -> Self {
        Self { cache, config }
    }

    /// Build session data stamped with this store's configured timeout.
    pub fn new_session(
        &self,
        client_id: impl Into<String>,
        user_id: uuid::Uuid,
        callback_url: impl Into<String>,
    ) -> SessionData {
        SessionData::new(
            client_id,
            user_id,
            callback_url,
            chrono::Duration::minutes(self.config.session_timeout_minutes),
        )
    }

    /// Persist a session and return its newly generated key.
    ///
    /// The cache entry carries an absolute-expiration hint equal to
    /// `data.expires`; exactly one cache write happens.
    ///
    /// # Errors
    ///
    /// * `InvalidSessionData` if `client_id` is empty
    /// * `SerializationError` / backend errors as-is
    pub async fn create(&self, data: &SessionData) -> SessionResult<String> {
        if data.client_id.is_empty() {
            return Err(SessionError::InvalidSessionData(
                "clientId must be non-empty".to_string(),
            ));
        }

        let session_key = generate_session_key();
        let serialized = serde_json::to_string(data)
            .map_err(|e| SessionError::SerializationError(e.to_string()))?;

        self.cache
            .set_string(&self.cache_key(&session_key), &serialized, data.expires)
            .await?;

        debug!(client_id = %data.client_id, "Created handoff session");
        Ok(session_key)
    }

    /// Fetch a session by key.
    ///
    /// Returns `None` for a missing session and for one whose `expires`
    /// has passed, even when the backend has not evicted the entry yet.
    ///
    /// # Errors
    ///
    /// * `EmptySessionKey` for an empty key argument
    /// * `DeserializationError` if the stored value is corrupt
    pub async fn retrieve(&self, session_key: &str) -> SessionResult<Option<SessionData>> {
        if session_key.is_empty() {
            return Err(SessionError::EmptySessionKey);
        }

        let Some(serialized) = self.cache.get_string(&self.cache_key(session_key)).await? else {
            return Ok(None);
        };

        let data: SessionData = serde_json::from_str(&serialized)
            .map_err(|e| SessionError::DeserializationError(e.to_string()))?;

        // The backend's TTL eviction may lag or drift; the session's own
        // expiry is authoritative.
        if data.is_expired_at(Utc::now()) {
            debug!(client_id = %data.client_id, "Handoff session expired before eviction");
            return Ok(None);
        }

        Ok(Some(data))
    }

    /// Remove a session. Idempotent: a missing or already-invalidated
    /// key is a no-op, never an error.
    ///
    /// # Errors
    ///
    /// * `EmptySessionKey` for an empty key argument
    pub async fn invalidate(&self, session_key: &str) -> SessionResult<()> {
        if session_key.is_empty() {
            return Err(SessionError::EmptySessionKey);
        }

        self.cache.remove(&self.cache_key(session_key)).await
    }

    fn cache_key(&self, session_key: &str) -> String {
        format!("{}{}", self.config.key_prefix, session_key)
    }
}

/// Generate a high-entropy random session key.
fn generate_session_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_KEY_LENGTH)
        .map(char::from)
        .collect()
}
