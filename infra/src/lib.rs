//! # Infrastructure Layer
//!
//! Concrete cache engines for the session coordinator.
//!
//! ## Features
//!
//! - `redis-cache`: Redis-backed [`cache::RedisCacheEngine`] (default)

use tp_core::errors::CacheError;

/// Cache module - Redis engine implementing the cache contract
pub mod cache;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InfrastructureError> for CacheError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Serialization(e) => CacheError::Serialization {
                message: e.to_string(),
            },
            other => CacheError::Backend {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_map_onto_cache_errors() {
        let config: CacheError = InfrastructureError::Config("bad url".to_string()).into();
        assert_eq!(
            config,
            CacheError::Backend {
                message: "Configuration error: bad url".to_string()
            }
        );

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let serialization: CacheError = InfrastructureError::from(json_err).into();
        assert!(matches!(serialization, CacheError::Serialization { .. }));

        let redis_err = redis::RedisError::from((redis::ErrorKind::IoError, "connection reset"));
        let backend: CacheError = InfrastructureError::from(redis_err).into();
        assert!(matches!(backend, CacheError::Backend { .. }));
    }
}
