//! Port for the session/cache key-value layer.

use std::time::Duration;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by session store adapters.
    pub enum SessionStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            "session store connection failed: {message}",
        /// The store rejected or failed the command.
        Backend { message: String } =>
            "session store command failed: {message}",
    }
}

/// Port for best-effort session and cache data.
///
/// The store is never the source of truth: core operations that do not
/// strictly need it must keep working when it degrades to the in-memory
/// fallback. Both adapters honour the same TTL contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a value, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError>;

    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration)
        -> Result<(), SessionStoreError>;

    /// Remove a key. Returns `false` when the key was absent.
    async fn delete(&self, key: &str) -> Result<bool, SessionStoreError>;

    /// Whether a live (unexpired) value exists for the key.
    async fn exists(&self, key: &str) -> Result<bool, SessionStoreError>;
}

/// Fixture store for tests that are not about session behaviour: always
/// empty, accepts every write, reports every delete as a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSessionStore;

#[async_trait]
impl SessionStore for FixtureSessionStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, SessionStoreError> {
        Ok(None)
    }

    async fn set(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<bool, SessionStoreError> {
        Ok(false)
    }

    async fn exists(&self, _key: &str) -> Result<bool, SessionStoreError> {
        Ok(false)
    }
}
