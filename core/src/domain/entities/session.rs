//! Session record stored in the cache engine, one per `sid`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::token::ClaimMap;
use crate::errors::CacheError;

/// Server-side state of one session.
///
/// The record lives as long as the refresh token; once the cache drops it,
/// every token carrying its `sid` stops verifying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session identifier
    pub sid: String,

    /// Owning subject
    pub subject: String,

    /// Current payload, returned by verification instead of the token copy
    pub payload: Option<ClaimMap>,

    /// Current header data
    pub header: Option<ClaimMap>,

    /// When the session was issued
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(
        sid: impl Into<String>,
        subject: impl Into<String>,
        payload: Option<ClaimMap>,
        header: Option<ClaimMap>,
    ) -> Self {
        Self {
            sid: sid.into(),
            subject: subject.into(),
            payload,
            header,
            created_at: Utc::now(),
        }
    }

    /// Encode for storage as a cache string value
    pub fn to_json(&self) -> Result<String, CacheError> {
        serde_json::to_string(self).map_err(|e| CacheError::Serialization {
            message: format!("Failed to encode session {}: {}", self.sid, e),
        })
    }

    /// Decode a stored cache value
    pub fn from_json(raw: &str) -> Result<Self, CacheError> {
        serde_json::from_str(raw).map_err(|e| CacheError::Serialization {
            message: format!("Failed to decode session record: {}", e),
        })
    }
}
