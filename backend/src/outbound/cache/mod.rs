//! Session store adapters: Redis-backed with an in-memory fallback.
//!
//! [`connect_with_fallback`] implements the degradation contract: when no
//! Redis URL is configured, or the configured instance cannot be reached
//! at startup, the process continues on [`InMemorySessionStore`] and the
//! switch is logged. Core operations never depend on which backend is
//! active.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::AsyncCommands;
use bb8_redis::RedisConnectionManager;
use tracing::{info, warn};

use crate::domain::ports::{SessionStore, SessionStoreError};

fn map_checkout_error(
    error: bb8_redis::bb8::RunError<bb8_redis::redis::RedisError>,
) -> SessionStoreError {
    SessionStoreError::connection(error.to_string())
}

fn map_command_error(error: bb8_redis::redis::RedisError) -> SessionStoreError {
    SessionStoreError::backend(error.to_string())
}

/// Redis-backed implementation of the `SessionStore` port.
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisSessionStore {
    /// Connect to Redis and verify the instance answers before returning.
    ///
    /// # Errors
    ///
    /// Returns a connection error when the URL is malformed, the pool
    /// cannot be built, or the instance does not answer a PING.
    pub async fn connect(redis_url: &str) -> Result<Self, SessionStoreError> {
        let manager = RedisConnectionManager::new(redis_url)
            .map_err(|err| SessionStoreError::connection(err.to_string()))?;
        let pool = Pool::builder()
            .build(manager)
            .await
            .map_err(|err| SessionStoreError::connection(err.to_string()))?;

        let store = Self { pool };
        store.ping().await?;
        Ok(store)
    }

    async fn ping(&self) -> Result<(), SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;
        let _: String = bb8_redis::redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|err| SessionStoreError::connection(err.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;
        let value: Option<String> = conn.get(key).await.map_err(map_command_error)?;
        Ok(value)
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;
        // SETEX rejects a zero expiry; clamp sub-second TTLs up to one.
        let seconds = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(key, value, seconds)
            .await
            .map_err(map_command_error)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;
        let removed: usize = conn.del(key).await.map_err(map_command_error)?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool, SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;
        let present: bool = conn.exists(key).await.map_err(map_command_error)?;
        Ok(present)
    }
}

/// In-memory implementation of the `SessionStore` port.
///
/// Fallback for local development and degraded startup. TTLs are honoured
/// by checking the deadline on read; expired entries are dropped the next
/// time they are touched.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    entries: Arc<Mutex<HashMap<String, (String, Instant)>>>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, (String, Instant)>) -> T,
    ) -> T {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        Ok(self.with_entries(|entries| match entries.get(key) {
            Some((value, deadline)) if *deadline > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }))
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let deadline = Instant::now() + ttl;
        self.with_entries(|entries| {
            entries.insert(key.to_string(), (value.to_string(), deadline));
        });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, SessionStoreError> {
        Ok(self.with_entries(|entries| match entries.remove(key) {
            Some((_, deadline)) => deadline > Instant::now(),
            None => false,
        }))
    }

    async fn exists(&self, key: &str) -> Result<bool, SessionStoreError> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Connect to the configured session backend, falling back to the
/// in-memory store when Redis is unconfigured or unreachable.
pub async fn connect_with_fallback(redis_url: Option<&str>) -> Arc<dyn SessionStore> {
    let Some(url) = redis_url else {
        info!("no session store configured, using in-memory fallback");
        return Arc::new(InMemorySessionStore::new());
    };

    match RedisSessionStore::connect(url).await {
        Ok(store) => {
            info!("session store connected");
            Arc::new(store)
        }
        Err(error) => {
            warn!(error = %error, "session store unreachable, using in-memory fallback");
            Arc::new(InMemorySessionStore::new())
        }
    }
}
