//! Shared configuration and boundary types for the TokenPair workspace
//!
//! This crate provides:
//! - Configuration types (token signing, session policy, cache, logging)
//! - Tracing subscriber initialisation
//! - Error response structures for transports in front of the coordinator

pub mod config;
pub mod errors;
pub mod logging;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CacheStrategyConfig, CacheType, Environment, LogFormat,
    LoggingConfig, MemoryCacheConfig, SessionConfig, TokenConfig,
};
pub use errors::{error_codes, ErrorResponse, IntoErrorResponse};
pub use logging::init_tracing;
