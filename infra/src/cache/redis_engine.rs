//! Redis-backed cache engine
//!
//! Implements the session store contract on a single multiplexed Redis
//! connection with retry and exponential backoff for transient failures.
//! Text values map to Redis strings and lists map to Redis lists, so the
//! list primitives are native `LPUSH`/`LPOS`/`LRANGE`/`LREM` calls.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, IntoConnectionInfo, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use tp_core::errors::CacheError;
use tp_core::repositories::cache::{slice_bounds, CacheEngine};
use tp_shared::CacheConfig;

use crate::InfrastructureError;

/// Upper bound for the backoff between retries
const MAX_RETRY_DELAY_MS: u64 = 5000;

/// Keys fetched per `SCAN` round trip
const SCAN_BATCH: usize = 100;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Cache engine storing sessions in Redis
///
/// Every key is namespaced with the configured prefix, so several
/// engines (or applications) can share one Redis database.
#[derive(Clone)]
pub struct RedisCacheEngine {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this engine
    config: CacheConfig,
}

impl RedisCacheEngine {
    /// Connect to Redis
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Connected engine or error
    ///
    /// # Example
    /// ```no_run
    /// use tp_infra::cache::RedisCacheEngine;
    /// use tp_shared::CacheConfig;
    ///
    /// async fn connect() -> Result<RedisCacheEngine, Box<dyn std::error::Error>> {
    ///     let config = CacheConfig::new("redis://localhost:6379").with_prefix("auth");
    ///     Ok(RedisCacheEngine::new(config).await?)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(
            "Creating Redis cache engine with URL: {} (database {}, prefix {:?})",
            mask_url(&config.url),
            config.database,
            config.key_prefix
        );

        let mut connection_info = config.url.as_str().into_connection_info().map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;
        if config.database != 0 {
            connection_info.redis.db = i64::from(config.database);
        }

        let client = Client::open(connection_info).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            InfrastructureError::Config(format!("Invalid Redis connection info: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(&client, &config).await?;

        info!("Redis cache engine ready");

        Ok(Self { connection, config })
    }

    /// Configuration this engine was built from
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    async fn create_connection_with_retry(
        client: &Client,
        config: &CacheConfig,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = config.retry_delay_ms;
        let connect_timeout = Duration::from_secs(config.connection_timeout.max(1));

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let result = match timeout(connect_timeout, client.get_multiplexed_async_connection()).await {
                Ok(result) => result,
                Err(_) => Err(RedisError::from(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "Timed out connecting to Redis",
                ))),
            };

            match result {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < config.max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, config.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Run an operation, retrying transient failures with exponential backoff
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.config.max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.config.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let result = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await;

        match result {
            Ok(response) if response == "PONG" => {
                debug!("Redis health check passed");
                Ok(true)
            }
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Stored keys under this engine's prefix
    async fn scan_prefixed(&self) -> RedisResult<Vec<String>> {
        let pattern = self.config.scan_pattern();
        self.execute_with_retry(move |mut conn| {
            let pattern = pattern.clone();
            Box::pin(async move {
                let mut cursor: u64 = 0;
                let mut found = Vec::new();
                loop {
                    let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn)
                        .await?;
                    found.extend(batch);
                    if next == 0 {
                        return Ok::<_, RedisError>(found);
                    }
                    cursor = next;
                }
            })
        })
        .await
    }
}

/// Translate a Redis failure for `key` into the engine error type
fn cache_error(key: &str, err: RedisError) -> CacheError {
    if err.code() == Some("WRONGTYPE") {
        return CacheError::TypeMismatch {
            key: key.to_string(),
        };
    }
    error!("Redis operation on '{}' failed: {}", key, err);
    InfrastructureError::Cache(err).into()
}

fn expiry_seconds(ttl: u64) -> i64 {
    i64::try_from(ttl).unwrap_or(i64::MAX)
}

/// How a `set` reaches Redis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetMode {
    Persist,
    Expire(u64),
    /// Zero TTL: the value would be expired on arrival, so the key is removed
    Discard,
}

/// Resolve the per-call TTL against the configured default
pub(crate) fn set_mode(ttl: Option<u64>, default_ttl: u64) -> SetMode {
    match ttl.or((default_ttl > 0).then_some(default_ttl)) {
        None => SetMode::Persist,
        Some(0) => SetMode::Discard,
        Some(seconds) => SetMode::Expire(seconds),
    }
}

#[async_trait]
impl CacheEngine for RedisCacheEngine {
    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<(), CacheError> {
        let stored_key = self.config.make_key(key);
        let mode = set_mode(ttl, self.config.default_ttl);
        debug!("Setting key '{}' ({:?})", stored_key, mode);

        self.execute_with_retry(|mut conn| {
            let key = stored_key.clone();
            let value = value.to_string();
            Box::pin(async move {
                match mode {
                    SetMode::Expire(seconds) => conn.set_ex::<_, _, ()>(key, value, seconds).await,
                    SetMode::Persist => conn.set::<_, _, ()>(key, value).await,
                    SetMode::Discard => conn.del::<_, ()>(key).await,
                }
            })
        })
        .await
        .map_err(|e| cache_error(key, e))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let stored_key = self.config.make_key(key);
        debug!("Getting key '{}'", stored_key);

        self.execute_with_retry(|mut conn| {
            let key = stored_key.clone();
            Box::pin(async move { conn.get::<_, Option<String>>(key).await })
        })
        .await
        .map_err(|e| cache_error(key, e))
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let stored_key = self.config.make_key(key);
        debug!("Deleting key '{}'", stored_key);

        let deleted = self
            .execute_with_retry(|mut conn| {
                let key = stored_key.clone();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await
            .map_err(|e| cache_error(key, e))?;

        Ok(deleted > 0)
    }

    async fn update_ttl(&self, key: &str, ttl: u64) -> Result<bool, CacheError> {
        let stored_key = self.config.make_key(key);
        debug!("Updating TTL of '{}' to {}s", stored_key, ttl);

        self.execute_with_retry(|mut conn| {
            let key = stored_key.clone();
            let expiry = expiry_seconds(ttl);
            Box::pin(async move { conn.expire::<_, bool>(key, expiry).await })
        })
        .await
        .map_err(|e| cache_error(key, e))
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let stored = self
            .scan_prefixed()
            .await
            .map_err(|e| cache_error(&self.config.scan_pattern(), e))?;

        Ok(stored
            .iter()
            .map(|key| self.config.strip_key(key).to_string())
            .collect())
    }

    async fn list_push_front(&self, key: &str, value: &str) -> Result<usize, CacheError> {
        let stored_key = self.config.make_key(key);
        debug!("Pushing onto list '{}'", stored_key);

        self.execute_with_retry(|mut conn| {
            let key = stored_key.clone();
            let value = value.to_string();
            Box::pin(async move { conn.lpush::<_, _, usize>(key, value).await })
        })
        .await
        .map_err(|e| cache_error(key, e))
    }

    async fn list_find(&self, key: &str, value: &str) -> Result<Option<usize>, CacheError> {
        let stored_key = self.config.make_key(key);

        self.execute_with_retry(|mut conn| {
            let key = stored_key.clone();
            let value = value.to_string();
            Box::pin(async move {
                redis::cmd("LPOS")
                    .arg(key)
                    .arg(value)
                    .query_async::<_, Option<usize>>(&mut conn)
                    .await
            })
        })
        .await
        .map_err(|e| cache_error(key, e))
    }

    async fn list_range(
        &self,
        key: &str,
        start: isize,
        end: isize,
    ) -> Result<Vec<String>, CacheError> {
        let stored_key = self.config.make_key(key);

        // LRANGE is inclusive; fetch everything and apply half-open bounds
        let list = self
            .execute_with_retry(|mut conn| {
                let key = stored_key.clone();
                Box::pin(async move { conn.lrange::<_, Vec<String>>(key, 0, -1).await })
            })
            .await
            .map_err(|e| cache_error(key, e))?;

        let bounds = slice_bounds(list.len(), start, end);
        Ok(list[bounds].to_vec())
    }

    async fn list_remove(&self, key: &str, value: &str, count: isize) -> Result<usize, CacheError> {
        let stored_key = self.config.make_key(key);
        debug!("Removing '{}' from list '{}' (count {})", value, stored_key, count);

        self.execute_with_retry(|mut conn| {
            let key = stored_key.clone();
            let value = value.to_string();
            let count = count;
            Box::pin(async move { conn.lrem::<_, _, usize>(key, count, value).await })
        })
        .await
        .map_err(|e| cache_error(key, e))
    }

    async fn reset_all(&self) -> Result<(), CacheError> {
        let pattern = self.config.scan_pattern();
        let stored = self
            .scan_prefixed()
            .await
            .map_err(|e| cache_error(&pattern, e))?;

        info!("Deleting {} keys matching '{}'", stored.len(), pattern);

        for chunk in stored.chunks(SCAN_BATCH) {
            let keys = chunk.to_vec();
            self.execute_with_retry(|mut conn| {
                let keys = keys.clone();
                Box::pin(async move { conn.del::<_, u64>(keys).await })
            })
            .await
            .map_err(|e| cache_error(&pattern, e))?;
        }

        Ok(())
    }
}

/// Check if a Redis error is retriable
///
/// Determines if an error is transient and the operation should be retried.
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask sensitive parts of Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
