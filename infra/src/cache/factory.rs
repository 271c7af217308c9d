//! Cache engine selection from configuration

use std::sync::Arc;
use tracing::info;

use tp_core::repositories::cache::{CacheEngine, MemoryCacheEngine};
use tp_shared::{CacheStrategyConfig, CacheType};

use super::RedisCacheEngine;
use crate::InfrastructureError;

/// Build the cache engine described by `config`.
///
/// Returns `None` when caching is disabled, which runs the session
/// coordinator cacheless.
pub async fn create_cache_engine(
    config: &CacheStrategyConfig,
) -> Result<Option<Arc<dyn CacheEngine>>, InfrastructureError> {
    if !config.enabled {
        info!("Session cache disabled; tokens will not be tracked");
        return Ok(None);
    }

    let engine: Arc<dyn CacheEngine> = match config.cache_type {
        CacheType::Memory => {
            info!("Using in-memory session cache");
            match config.memory.default_ttl {
                Some(ttl) => Arc::new(MemoryCacheEngine::with_default_ttl(ttl)),
                None => Arc::new(MemoryCacheEngine::new()),
            }
        }
        CacheType::Redis => Arc::new(RedisCacheEngine::new(config.redis.clone()).await?),
    };

    Ok(Some(engine))
}
