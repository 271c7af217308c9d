//! Configuration module with sub-modules per concern
//!
//! - `auth` - Token signing and session policy configuration
//! - `cache` - Cache engine selection and Redis configuration
//! - `environment` - Environment detection and logging configuration

pub mod auth;
pub mod cache;
pub mod environment;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::{SessionConfig, TokenConfig};
pub use cache::{CacheConfig, CacheStrategyConfig, CacheType, MemoryCacheConfig};
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Token signing configuration
    pub token: TokenConfig,

    /// Session policy
    #[serde(default)]
    pub session: SessionConfig,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheStrategyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            token: TokenConfig::default(),
            session: SessionConfig::default(),
            cache: CacheStrategyConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            token: TokenConfig::default(),
            session: SessionConfig::default(),
            cache: CacheStrategyConfig {
                cache_type: CacheType::Memory,
                ..Default::default()
            },
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            token: TokenConfig::from_env().with_default_secret_allowed(false),
            session: SessionConfig::from_env(),
            cache: CacheStrategyConfig::from_env(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from environment
    ///
    /// Reads a `.env` file first when one is present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let environment = Environment::from_env();
        dotenvy::from_filename(environment.env_file()).ok();

        Self {
            environment,
            token: TokenConfig::from_env()
                .with_default_secret_allowed(!environment.is_production()),
            session: SessionConfig::from_env(),
            cache: CacheStrategyConfig::from_env(),
            logging: LoggingConfig::for_environment(environment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_uses_memory_cache() {
        let config = AppConfig::development();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.cache.cache_type, CacheType::Memory);
        assert!(config.cache.enabled);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.session.multi_session);
        assert_eq!(config.session.key_prefix, "auth");
        assert!(config.token.is_using_default_secret());
    }

    #[test]
    fn test_production_forbids_default_secret() {
        let config = AppConfig::production();
        assert!(!config.token.allow_default_secret);
        assert!(AppConfig::development().token.allow_default_secret);
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "environment": "staging",
                "token": {"secret": "s", "access_ttl": 60, "refresh_ttl": 600}
            }"#,
        )
        .unwrap();
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.token.refresh_ttl, 600);
        assert!(config.cache.enabled);
    }
}
