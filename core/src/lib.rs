//! # TokenPair Core
//!
//! Token lifecycle and session coordination: the signed token codec, the
//! cache engine contract with an in-memory engine, and the session
//! coordinator built on both.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{ClaimMap, Claims, SessionRecord, TokenKind, TokenPair, VerifiedToken};
pub use errors::{CacheError, DomainError, DomainResult, TokenError};
pub use repositories::{CacheEngine, MemoryCacheEngine};
pub use services::{SessionCoordinator, TokenCodec};
