//! Payments Service configuration.
//!
//! Configuration is loaded once from environment variables at startup;
//! there is no dynamic reconfiguration.

use common::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default JWKS cache TTL in seconds (5 minutes).
pub const DEFAULT_JWKS_CACHE_TTL_SECONDS: u64 = 300;

/// Payments Service configuration.
///
/// Loaded from environment variables with sensible defaults. The issuer URI
/// and audience have no defaults: a resource server that guesses its issuer
/// is misconfigured, not degraded.
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth issuer base URI; also the expected `iss` claim value.
    pub issuer_uri: String,

    /// Expected `aud` claim value for accepted tokens.
    pub audience: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Clock skew tolerance in seconds for temporal claim validation.
    pub jwt_clock_skew_seconds: i64,

    /// How long fetched signing key sets are served from cache, in seconds.
    pub jwks_cache_ttl_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT clock skew configuration: {0}")]
    InvalidJwtClockSkew(String),

    #[error("Invalid JWKS cache TTL configuration: {0}")]
    InvalidJwksCacheTtl(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let issuer_uri = vars
            .get("OAUTH_ISSUER_URI")
            .ok_or_else(|| ConfigError::MissingEnvVar("OAUTH_ISSUER_URI".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let audience = vars
            .get("OAUTH_AUDIENCE")
            .ok_or_else(|| ConfigError::MissingEnvVar("OAUTH_AUDIENCE".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        // Safe casts: both constants are far below i64::MAX seconds
        #[allow(clippy::cast_possible_wrap)]
        let max_skew_seconds = MAX_CLOCK_SKEW.as_secs() as i64;
        #[allow(clippy::cast_possible_wrap)]
        let default_skew_seconds = DEFAULT_CLOCK_SKEW.as_secs() as i64;

        // Parse JWT clock skew tolerance with validation
        let jwt_clock_skew_seconds = if let Some(value_str) = vars.get("JWT_CLOCK_SKEW_SECONDS") {
            let value: i64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value <= 0 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be positive, got {}",
                    value
                )));
            }

            if value > max_skew_seconds {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must not exceed {} seconds, got {}",
                    MAX_CLOCK_SKEW.as_secs(),
                    value
                )));
            }

            value
        } else {
            default_skew_seconds
        };

        // Parse JWKS cache TTL with validation
        let jwks_cache_ttl_seconds = if let Some(value_str) = vars.get("JWKS_CACHE_TTL_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwksCacheTtl(format!(
                    "JWKS_CACHE_TTL_SECONDS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidJwksCacheTtl(
                    "JWKS_CACHE_TTL_SECONDS must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_JWKS_CACHE_TTL_SECONDS
        };

        Ok(Config {
            issuer_uri,
            audience,
            bind_address,
            jwt_clock_skew_seconds,
            jwks_cache_ttl_seconds,
        })
    }
}
