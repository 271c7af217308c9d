//! Domain entities for tokens and sessions.

pub mod session;
pub mod token;


// Re-export commonly used types
pub use session::SessionRecord;
pub use token::{ClaimMap, Claims, TokenKind, TokenPair, VerifiedToken};
