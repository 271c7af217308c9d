//! Token, session and cache error types
//!
//! The token error kinds stay distinct all the way to the caller so that
//! client code can choose between silently refreshing and prompting for a
//! new login.

use thiserror::Error;
use tp_shared::{error_codes, ErrorResponse, IntoErrorResponse};

use crate::domain::entities::token::TokenKind;

/// Token and session validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed token or bad signature
    #[error("Incorrect token")]
    IncorrectToken,

    /// Signature is valid but the expiry (plus leeway) has passed
    #[error("Token expired")]
    TtlExpired,

    /// Valid token of the wrong kind for the operation
    #[error("Wrong token type: expected {expected}, got {actual}")]
    WrongType { expected: TokenKind, actual: TokenKind },

    /// Valid token whose session is gone (rotated, revoked or expired)
    #[error("Session is not valid")]
    NotValidSession,

    /// Unclassified failure while decoding or encoding
    #[error("Unknown token error: {message}")]
    Unknown { message: String },
}

impl TokenError {
    /// Whether presenting a refresh token may recover from this error
    pub fn can_refresh(&self) -> bool {
        matches!(self, TokenError::TtlExpired)
    }

    /// Whether the caller has to authenticate again from scratch.
    ///
    /// An expired access token is not included: the holder may still own a
    /// live refresh token.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, TokenError::IncorrectToken | TokenError::NotValidSession)
    }

    /// Stable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::IncorrectToken => error_codes::TOKEN_INVALID,
            TokenError::TtlExpired => error_codes::TOKEN_EXPIRED,
            TokenError::WrongType { .. } => error_codes::TOKEN_WRONG_TYPE,
            TokenError::NotValidSession => error_codes::SESSION_INVALID,
            TokenError::Unknown { .. } => error_codes::TOKEN_UNKNOWN_ERROR,
        }
    }
}

/// Cache engine failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Operation applied to a key holding the other value type
    #[error("Key '{key}' holds a value of the wrong type")]
    TypeMismatch { key: String },

    /// Stored value could not be encoded or decoded
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Backend failure (connection, protocol, timeout)
    #[error("Cache backend error: {message}")]
    Backend { message: String },
}

impl From<TokenError> for ErrorResponse {
    fn from(err: TokenError) -> Self {
        let response = ErrorResponse::new(err.code(), err.to_string());
        if err.can_refresh() {
            response.add_detail("can_refresh", true)
        } else {
            response
        }
    }
}

impl IntoErrorResponse for TokenError {
    fn to_error_response(&self) -> ErrorResponse {
        self.clone().into()
    }
}

impl IntoErrorResponse for CacheError {
    fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(error_codes::CACHE_ERROR, self.to_string())
    }
}
