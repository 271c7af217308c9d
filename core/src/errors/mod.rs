//! Domain-specific error types and error handling.

mod types;


// Re-export all error types
pub use types::{CacheError, TokenError};

use thiserror::Error;
use tp_shared::{error_codes, ErrorResponse, IntoErrorResponse};

/// Core domain errors (general purpose)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl DomainError {
    /// The token error kind, if this is one
    pub fn as_token_error(&self) -> Option<&TokenError> {
        match self {
            DomainError::Token(err) => Some(err),
            _ => None,
        }
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            DomainError::Token(err) => err.to_error_response(),
            DomainError::Cache(err) => err.to_error_response(),
            DomainError::Internal { message } => {
                ErrorResponse::new(error_codes::INTERNAL_ERROR, message.clone())
            }
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
