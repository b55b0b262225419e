//! Runtime configuration loaded from the process environment.
//!
//! `DATABASE_URL` is the only required variable. `REDIS_URL` is optional;
//! when absent the session store degrades to the in-memory fallback at
//! startup. Pool sizing variables override the defaults carried by
//! [`AppConfig`].

use std::env;
use std::time::Duration;

/// Default maximum size of the database connection pool.
pub const DEFAULT_DB_POOL_MAX_SIZE: u32 = 10;
/// Default minimum number of idle database connections.
pub const DEFAULT_DB_POOL_MIN_IDLE: u32 = 2;
/// Default checkout timeout for pooled database connections.
pub const DEFAULT_DB_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
/// Default session lifetime applied by callers that do not choose one.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("missing required environment variable: {name}")]
    MissingVar { name: &'static str },

    /// A variable was set but could not be parsed.
    #[error("invalid value for {name}: {message}")]
    InvalidVar { name: &'static str, message: String },
}

impl ConfigError {
    fn missing(name: &'static str) -> Self {
        Self::MissingVar { name }
    }

    fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidVar {
            name,
            message: message.into(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    database_url: String,
    redis_url: Option<String>,
    db_pool_max_size: u32,
    db_pool_min_idle: Option<u32>,
    db_connection_timeout: Duration,
    session_ttl: Duration,
}

impl AppConfig {
    /// Build a configuration with defaults around the one required value.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            redis_url: None,
            db_pool_max_size: DEFAULT_DB_POOL_MAX_SIZE,
            db_pool_min_idle: Some(DEFAULT_DB_POOL_MIN_IDLE),
            db_connection_timeout: DEFAULT_DB_CONNECTION_TIMEOUT,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Set the session store URL.
    #[must_use]
    pub fn with_redis_url(mut self, redis_url: Option<String>) -> Self {
        self.redis_url = redis_url;
        self
    }

    /// Set the maximum database pool size.
    #[must_use]
    pub fn with_db_pool_max_size(mut self, max_size: u32) -> Self {
        self.db_pool_max_size = max_size;
        self
    }

    /// Set the minimum number of idle database connections.
    #[must_use]
    pub fn with_db_pool_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.db_pool_min_idle = min_idle;
        self
    }

    /// Set the database connection checkout timeout.
    #[must_use]
    pub fn with_db_connection_timeout(mut self, timeout: Duration) -> Self {
        self.db_connection_timeout = timeout;
        self
    }

    /// Set the default session lifetime.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through a variable lookup function.
    ///
    /// Exists so tests can exercise parsing without mutating process-wide
    /// environment state.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::missing("DATABASE_URL"))?;

        let redis_url = lookup("REDIS_URL").filter(|value| !value.trim().is_empty());

        let mut config = Self::new(database_url).with_redis_url(redis_url);

        if let Some(raw) = lookup("DB_POOL_MAX_SIZE") {
            config.db_pool_max_size = parse_u32("DB_POOL_MAX_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("DB_POOL_MIN_IDLE") {
            config.db_pool_min_idle = Some(parse_u32("DB_POOL_MIN_IDLE", &raw)?);
        }
        if let Some(raw) = lookup("DB_CONNECTION_TIMEOUT_SECS") {
            config.db_connection_timeout =
                Duration::from_secs(parse_u32("DB_CONNECTION_TIMEOUT_SECS", &raw)?.into());
        }
        if let Some(raw) = lookup("SESSION_TTL_SECS") {
            config.session_ttl =
                Duration::from_secs(parse_u32("SESSION_TTL_SECS", &raw)?.into());
        }

        Ok(config)
    }

    /// Connection string for the PostgreSQL database.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Connection string for the session store, when configured.
    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url.as_deref()
    }

    /// Maximum database pool size.
    pub const fn db_pool_max_size(&self) -> u32 {
        self.db_pool_max_size
    }

    /// Minimum number of idle database connections.
    pub const fn db_pool_min_idle(&self) -> Option<u32> {
        self.db_pool_min_idle
    }

    /// Database connection checkout timeout.
    pub const fn db_connection_timeout(&self) -> Duration {
        self.db_connection_timeout
    }

    /// Default session lifetime.
    pub const fn session_ttl(&self) -> Duration {
        self.session_ttl
    }
}

fn parse_u32(name: &'static str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|err| ConfigError::invalid(name, err.to_string()))
}
