//! Business services containing the token and session logic.

pub mod session;
pub mod token;

// Re-export commonly used types
pub use session::SessionCoordinator;
pub use token::TokenCodec;
