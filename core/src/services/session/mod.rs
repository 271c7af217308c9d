//! Session coordinator module
//!
//! Session lifecycle on top of the token codec:
//! - Issuance with single- or multi-session policy
//! - Verification against the stored session record
//! - Rotation of refresh tokens and in-session data updates
//! - Revocation of one, all, or all-but-one sessions

mod coordinator;


pub use coordinator::SessionCoordinator;
