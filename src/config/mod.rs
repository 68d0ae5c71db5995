//! Configuration management for the loans service
//!
//! This module handles loading and validating configuration from environment variables,
//! with support for different environments (development, staging, production).

use std::env;
use std::net::IpAddr;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse environment from string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Get the environment name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Current environment
    pub environment: Environment,

    /// Address the server binds to
    pub bind_addr: IpAddr,

    /// Server port
    pub port: u16,

    /// Log level (RUST_LOG)
    pub log_level: String,

    /// Identity provider domain; issuer is `https://{domain}/`
    pub auth_domain: Option<String>,

    /// Expected token audience
    pub auth_audience: Option<String>,

    /// Name of the claim carrying the caller's roles
    pub role_claim: String,

    /// How long fetched signing keys are trusted
    pub jwks_cache_ttl_seconds: u64,

    /// HS256 secret accepted when no identity provider is configured (development only)
    pub auth_dev_secret: Option<String>,

    /// CORS allowed origins
    pub cors_allowed_origins: Option<String>,

    /// Start the ledger with the demo loan
    pub seed_demo_data: bool,
}

pub const DEFAULT_ROLE_CLAIM: &str = "https://cnd.example/roles";

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .map(|s| Environment::parse(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidValue("BIND_ADDR must be an IP address".to_string()))?;

        let port = var("PORT")
            .unwrap_or_else(|| "7071".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let log_level = var("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let auth_domain = var("AUTH_DOMAIN").map(|d| {
            d.trim()
                .trim_start_matches("https://")
                .trim_end_matches('/')
                .to_string()
        });
        let auth_audience = var("AUTH_AUDIENCE");
        let role_claim = var("ROLE_CLAIM").unwrap_or_else(|| DEFAULT_ROLE_CLAIM.to_string());

        let jwks_cache_ttl_seconds = var("JWKS_CACHE_TTL_SECONDS")
            .unwrap_or_else(|| "600".to_string())
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "JWKS_CACHE_TTL_SECONDS must be a whole number of seconds".to_string(),
                )
            })?;

        let auth_dev_secret = var("AUTH_DEV_SECRET");
        if auth_dev_secret.is_some() && environment.is_production() {
            return Err(ConfigError::InvalidValue(
                "AUTH_DEV_SECRET must not be set in production".to_string(),
            ));
        }
        if environment.is_production() && auth_domain.is_none() {
            return Err(ConfigError::MissingEnvVar("AUTH_DOMAIN".to_string()));
        }

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS");

        let seed_demo_data = match var("SEED_DEMO_DATA") {
            Some(v) => parse_bool(&v).ok_or_else(|| {
                ConfigError::InvalidValue(format!("SEED_DEMO_DATA must be true or false, got '{}'", v))
            })?,
            None => !environment.is_production(),
        };

        Ok(Config {
            environment,
            bind_addr,
            port,
            log_level,
            auth_domain,
            auth_audience,
            role_claim,
            jwks_cache_ttl_seconds,
            auth_dev_secret,
            cors_allowed_origins,
            seed_demo_data,
        })
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("dev").unwrap(), Environment::Development);
        assert_eq!(Environment::parse("staging").unwrap(), Environment::Staging);
        assert_eq!(Environment::parse("PROD").unwrap(), Environment::Production);
        assert!(Environment::parse("invalid").is_err());
    }

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
        assert_eq!(Environment::Production.as_str(), "production");
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.port, 7071);
        assert_eq!(config.role_claim, DEFAULT_ROLE_CLAIM);
        assert_eq!(config.jwks_cache_ttl_seconds, 600);
        assert!(config.auth_domain.is_none());
        assert!(config.seed_demo_data);
    }

    #[test]
    fn test_auth_domain_normalized() {
        let config = config_from(&[
            ("AUTH_DOMAIN", "https://campus.eu.auth0.com/"),
            ("AUTH_AUDIENCE", "https://loans.campus"),
        ])
        .unwrap();
        assert_eq!(config.auth_domain.as_deref(), Some("campus.eu.auth0.com"));
        assert_eq!(config.auth_audience.as_deref(), Some("https://loans.campus"));
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(_)));
    }

    #[test]
    fn test_invalid_jwks_ttl() {
        let err = config_from(&[("JWKS_CACHE_TTL_SECONDS", "ten minutes")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
        assert!(err.to_string().contains("JWKS_CACHE_TTL_SECONDS"));

        let config = config_from(&[("JWKS_CACHE_TTL_SECONDS", "60")]).unwrap();
        assert_eq!(config.jwks_cache_ttl_seconds, 60);
    }

    #[test]
    fn test_production_rules() {
        let err = config_from(&[("ENVIRONMENT", "prod")]).unwrap_err();
        assert!(err.to_string().contains("AUTH_DOMAIN"));

        let err = config_from(&[
            ("ENVIRONMENT", "prod"),
            ("AUTH_DOMAIN", "campus.auth0.com"),
            ("AUTH_DEV_SECRET", "shh"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));

        let config = config_from(&[("ENVIRONMENT", "prod"), ("AUTH_DOMAIN", "campus.auth0.com")])
            .unwrap();
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn test_seed_flag() {
        assert!(!config_from(&[("SEED_DEMO_DATA", "false")]).unwrap().seed_demo_data);
        assert!(config_from(&[("SEED_DEMO_DATA", "maybe")]).is_err());
    }
}
