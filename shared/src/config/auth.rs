//! Token signing and session policy configuration

use serde::{Deserialize, Serialize};

use super::environment::Environment;

const DEFAULT_SECRET: &str = "development-secret-please-change-in-production";

/// Signing and lifetime settings for access/refresh token pairs
///
/// Built once when the process is configured and handed to the coordinator
/// by value. TTLs and leeway are in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenConfig {
    /// HMAC signing secret
    pub secret: String,

    /// Access token lifetime in seconds
    pub access_ttl: u64,

    /// Refresh token lifetime in seconds (also the session record lifetime)
    pub refresh_ttl: u64,

    /// Seconds of clock skew tolerated when checking expiry
    #[serde(default)]
    pub leeway: u64,

    /// Algorithm for token signing (HS256, HS384 or HS512)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Whether the built-in development secret may sign tokens
    #[serde(default = "default_allow_default_secret")]
    pub allow_default_secret: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_SECRET),
            access_ttl: 900,      // 15 minutes
            refresh_ttl: 604800,  // 7 days
            leeway: 0,
            algorithm: default_algorithm(),
            allow_default_secret: default_allow_default_secret(),
        }
    }
}

impl TokenConfig {
    /// Create a new token configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token lifetime in seconds
    pub fn with_access_ttl(mut self, seconds: u64) -> Self {
        self.access_ttl = seconds;
        self
    }

    /// Set refresh token lifetime in seconds
    pub fn with_refresh_ttl(mut self, seconds: u64) -> Self {
        self.refresh_ttl = seconds;
        self
    }

    /// Set the expiry leeway in seconds
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway = seconds;
        self
    }

    /// Set the signing algorithm name
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Permit or forbid signing with the built-in development secret
    pub fn with_default_secret_allowed(mut self, allowed: bool) -> Self {
        self.allow_default_secret = allowed;
        self
    }

    /// Create from environment variables
    ///
    /// In production the development secret is forbidden, so a missing
    /// `TOKEN_SECRET` makes codec construction fail.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            allow_default_secret: !Environment::from_env().is_production(),
            secret: std::env::var("TOKEN_SECRET").unwrap_or(defaults.secret),
            access_ttl: env_parse("TOKEN_ACCESS_TTL", defaults.access_ttl),
            refresh_ttl: env_parse("TOKEN_REFRESH_TTL", defaults.refresh_ttl),
            leeway: env_parse("TOKEN_LEEWAY", defaults.leeway),
            algorithm: std::env::var("TOKEN_ALGORITHM").unwrap_or(defaults.algorithm),
        }
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

/// Session policy for the coordinator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Allow independent concurrent sessions per subject.
    /// When false, issuing a new pair evicts every prior session.
    #[serde(default = "default_multi_session")]
    pub multi_session: bool,

    /// Namespace for session keys in the cache engine
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            multi_session: default_multi_session(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl SessionConfig {
    /// Single-session policy: each issuance evicts the subject's other sessions
    pub fn single_session() -> Self {
        Self {
            multi_session: false,
            ..Default::default()
        }
    }

    /// Multi-session policy: sessions coexist until rotated or revoked
    pub fn multi_session() -> Self {
        Self {
            multi_session: true,
            ..Default::default()
        }
    }

    /// Set the key namespace
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            multi_session: env_parse("SESSION_MULTI", defaults.multi_session),
            key_prefix: std::env::var("SESSION_KEY_PREFIX").unwrap_or(defaults.key_prefix),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, fallback: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(fallback)
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_allow_default_secret() -> bool {
    true
}

fn default_multi_session() -> bool {
    true
}

fn default_key_prefix() -> String {
    String::from("auth")
}
