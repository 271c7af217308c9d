//! Storage contracts and their in-process implementations.

pub mod cache;

pub use cache::{CacheEngine, MemoryCacheEngine};
