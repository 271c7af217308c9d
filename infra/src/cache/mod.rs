//! Cache module for Redis-based session storage
//!
//! Provides the Redis implementation of the cache engine contract,
//! including connection setup, retry logic and key namespacing.

pub mod factory;
pub mod redis_engine;

#[cfg(test)]
mod tests;

pub use factory::create_cache_engine;
pub use redis_engine::RedisCacheEngine;

// Re-export commonly used types
pub use tp_shared::CacheConfig;
