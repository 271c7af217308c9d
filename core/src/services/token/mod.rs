//! Token codec module
//!
//! Stateless signing and validation of access/refresh tokens. Session
//! tracking lives in the session coordinator on top of this.

mod codec;
mod config;


pub use codec::TokenCodec;
pub use config::SUPPORTED_ALGORITHMS;
