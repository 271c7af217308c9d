//! Cache configuration module

use serde::{Deserialize, Serialize};

/// Redis cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Connection timeout in seconds
    pub connection_timeout: u64,

    /// Default TTL for cache entries in seconds
    #[serde(default = "default_ttl")]
    pub default_ttl: u64,

    /// Enable cache key prefix
    #[serde(default)]
    pub key_prefix: Option<String>,

    /// Redis database number (0-15)
    #[serde(default)]
    pub database: u8,

    /// Maximum attempts for a single operation (including the first)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds (doubled per attempt)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            connection_timeout: 5,
            default_ttl: default_ttl(),
            key_prefix: None,
            database: 0,
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let url = std::env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let key_prefix = std::env::var("REDIS_KEY_PREFIX").ok();

        Self {
            url,
            key_prefix,
            ..Default::default()
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Set the database number
    pub fn with_database(mut self, db: u8) -> Self {
        self.database = db.min(15);
        self
    }

    /// Set retry behaviour for transient failures
    pub fn with_retry(mut self, max_retries: u32, retry_delay_ms: u64) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    /// Strip the configured prefix from a stored key
    pub fn strip_key<'a>(&self, stored: &'a str) -> &'a str {
        match &self.key_prefix {
            Some(prefix) => stored
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .unwrap_or(stored),
            None => stored,
        }
    }

    /// Pattern matching every key owned by this configuration
    pub fn scan_pattern(&self) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:*", prefix),
            None => String::from("*"),
        }
    }
}

/// In-memory cache configuration (for development/testing)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MemoryCacheConfig {
    /// TTL in seconds applied when a write carries none
    #[serde(default)]
    pub default_ttl: Option<u64>,
}

/// Cache strategy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheStrategyConfig {
    /// Enable session tracking through a cache engine.
    /// Disabled means cacheless mode: tokens are signed and verified only.
    pub enabled: bool,

    /// Cache type (redis, memory)
    #[serde(default = "default_cache_type")]
    pub cache_type: CacheType,

    /// Redis configuration
    #[serde(default)]
    pub redis: CacheConfig,

    /// Memory cache configuration
    #[serde(default)]
    pub memory: MemoryCacheConfig,
}

/// Cache type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    Redis,
    Memory,
}

impl std::str::FromStr for CacheType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(CacheType::Redis),
            "memory" | "mem" => Ok(CacheType::Memory),
            _ => Err(format!("Invalid cache type: {}", s)),
        }
    }
}

impl Default for CacheStrategyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_type: default_cache_type(),
            redis: CacheConfig::default(),
            memory: MemoryCacheConfig::default(),
        }
    }
}

impl CacheStrategyConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let enabled = std::env::var("CACHE_ENABLED")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(true);
        let cache_type = std::env::var("CACHE_TYPE")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(default_cache_type);

        Self {
            enabled,
            cache_type,
            redis: CacheConfig::from_env(),
            memory: MemoryCacheConfig::default(),
        }
    }

    /// Configuration with no cache engine
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

fn default_ttl() -> u64 {
    3600  // 1 hour
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

fn default_cache_type() -> CacheType {
    CacheType::Redis
}
