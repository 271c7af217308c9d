//! Token entities for signed access/refresh pairs.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Free-form JSON object carried in the `payload` and `header` claims
pub type ClaimMap = serde_json::Map<String, serde_json::Value>;

/// Kind of a token within a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims structure for the signed token body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (opaque user identifier)
    pub sub: String,

    /// Token kind
    pub kind: TokenKind,

    /// Session identifier shared by both tokens of a pair
    pub sid: String,

    /// Unique identifier of this token
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp; absent for tokens that never expire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Caller-supplied payload
    #[serde(default)]
    pub payload: Option<ClaimMap>,

    /// Caller-supplied header data
    #[serde(default)]
    pub header: Option<ClaimMap>,
}

impl Claims {
    /// Creates claims that expire `ttl_seconds` after now, or never when
    /// `ttl_seconds` is `None`
    pub fn new(
        subject: impl Into<String>,
        kind: TokenKind,
        sid: impl Into<String>,
        payload: Option<ClaimMap>,
        header: Option<ClaimMap>,
        ttl_seconds: Option<u64>,
    ) -> Self {
        let now = Utc::now().timestamp();
        let exp = ttl_seconds.map(|ttl| now.saturating_add(i64::try_from(ttl).unwrap_or(i64::MAX)));

        Self {
            sub: subject.into(),
            kind,
            sid: sid.into(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp,
            payload,
            header,
        }
    }

    /// Checks if the claims have expired (no leeway)
    pub fn is_expired(&self) -> bool {
        self.exp.is_some_and(|exp| Utc::now().timestamp() >= exp)
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed access token
    pub access_token: String,

    /// Signed refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub access_expires_in: u64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: u64,
}

impl TokenPair {
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: u64,
        refresh_expires_in: u64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in,
            refresh_expires_in,
        }
    }
}

/// Outcome of a successful verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedToken {
    /// Subject the token was issued for
    pub subject: String,

    /// Session identifier embedded in the token
    pub sid: String,

    /// Header data (from the session record when one is tracked)
    pub header: Option<ClaimMap>,

    /// Payload data (from the session record when one is tracked)
    pub payload: Option<ClaimMap>,
}

impl From<Claims> for VerifiedToken {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            sid: claims.sid,
            header: claims.header,
            payload: claims.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_map() -> ClaimMap {
        let mut map = ClaimMap::new();
        map.insert("data".to_string(), json!("user"));
        map
    }

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("1", TokenKind::Access, "sid-1", Some(sample_map()), None, Some(60));

        assert_eq!(claims.sub, "1");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.sid, "sid-1");
        assert_eq!(claims.exp, Some(claims.iat + 60));
        assert!(!claims.is_expired());
        assert!(claims.header.is_none());
    }

    #[test]
    fn test_claims_have_unique_ids() {
        let a = Claims::new("1", TokenKind::Access, "sid", None, None, Some(60));
        let b = Claims::new("1", TokenKind::Access, "sid", None, None, Some(60));
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_claims_expiration() {
        let mut claims = Claims::new("1", TokenKind::Refresh, "sid", None, None, Some(60));
        claims.exp = Some(Utc::now().timestamp() - 1);
        assert!(claims.is_expired());
    }

    #[test]
    fn test_claims_without_expiry() {
        let claims = Claims::new("1", TokenKind::Access, "sid", None, None, None);
        assert!(claims.exp.is_none());
        assert!(!claims.is_expired());

        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("exp").is_none());
        let parsed: Claims = serde_json::from_value(json).unwrap();
        assert!(parsed.exp.is_none());
    }

    #[test]
    fn test_kind_wire_format() {
        let claims = Claims::new("1", TokenKind::Refresh, "sid", None, None, Some(5));
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["kind"], "refresh");
        assert_eq!(TokenKind::Access.to_string(), "access");
    }

    #[test]
    fn test_verified_token_from_claims() {
        let claims = Claims::new("7", TokenKind::Access, "sid-7", None, Some(sample_map()), Some(5));
        let verified = VerifiedToken::from(claims);
        assert_eq!(verified.subject, "7");
        assert_eq!(verified.sid, "sid-7");
        assert_eq!(verified.header, Some(sample_map()));
        assert!(verified.payload.is_none());
    }
}
