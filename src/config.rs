//! Server configuration module
//! Loads server, token and storage settings from the environment

use crate::constants::{DEFAULT_HOST, DEFAULT_IMAGE_BUCKET, DEFAULT_PORT, DEFAULT_TOKEN_TTL_MINUTES};
use crate::error::{ClinicError, Result};
use std::env;
use std::time::Duration;
use url::Url;

/// Which table/object store backs the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Hosted store reached over its REST API
    Rest { url: Url, api_key: String },
    /// Process memory; data is lost on restart
    Memory,
}

/// Server configuration parameters
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Symmetric key for token signing/validation
    pub jwt_secret: String,
    /// Lifetime of issued tokens
    pub token_ttl: Duration,
    pub storage: StorageBackend,
    /// Bucket receiving pet images
    pub image_bucket: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        panic!("ServerConfig::default() is not allowed for security reasons. Use ServerConfig::from_env() instead.");
    }
}

impl ServerConfig {
    /// Create a test configuration - DANGEROUS: Only for testing!
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            jwt_secret: "test-jwt-secret-only-for-unit-tests-never-use-in-production".to_string(),
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_MINUTES as u64 * 60),
            storage: StorageBackend::Memory,
            image_bucket: DEFAULT_IMAGE_BUCKET.to_string(),
        }
    }

    /// Validate that the signing secret meets security requirements
    fn validate_jwt_secret(secret: &str) -> Result<()> {
        if secret.len() < 32 {
            return Err(ClinicError::ConfigError(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        // Check for insecure default or example values
        let insecure_patterns = [
            "your-secret-key",
            "change-this",
            "changeme",
            "test-secret",
            "default",
            "secret",
            "password",
            "12345",
        ];

        for pattern in &insecure_patterns {
            if secret.to_lowercase().contains(pattern) {
                return Err(ClinicError::ConfigError(format!(
                    "JWT secret contains insecure pattern '{}'. Please use a secure random secret generated with: openssl rand -base64 32",
                    pattern
                )));
            }
        }

        if secret.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ClinicError::ConfigError(
                "JWT secret should contain mixed characters (letters, numbers, symbols) for security".to_string(),
            ));
        }

        Ok(())
    }

    fn storage_from_env() -> Result<StorageBackend> {
        let backend = env::var("CLINIC_STORAGE_BACKEND").unwrap_or_else(|_| "rest".to_string());

        match backend.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "rest" => {
                let raw_url = env::var("SUPABASE_URL").map_err(|_| {
                    ClinicError::ConfigError(
                        "SUPABASE_URL environment variable is required for the rest storage backend".to_string(),
                    )
                })?;
                let url = Url::parse(&raw_url).map_err(|e| {
                    ClinicError::ConfigError(format!("SUPABASE_URL is not a valid URL: {}", e))
                })?;
                if url.scheme() != "https" && url.scheme() != "http" {
                    return Err(ClinicError::ConfigError(format!(
                        "SUPABASE_URL must use http or https, got '{}'",
                        url.scheme()
                    )));
                }

                let api_key = env::var("SUPABASE_KEY").map_err(|_| {
                    ClinicError::ConfigError(
                        "SUPABASE_KEY environment variable is required for the rest storage backend".to_string(),
                    )
                })?;
                if api_key.trim().is_empty() {
                    return Err(ClinicError::ConfigError("SUPABASE_KEY must not be empty".to_string()));
                }

                Ok(StorageBackend::Rest { url, api_key })
            }
            other => Err(ClinicError::ConfigError(format!(
                "Unknown CLINIC_STORAGE_BACKEND '{}'; expected 'rest' or 'memory'",
                other
            ))),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let host = env::var("CLINIC_HOST").unwrap_or(DEFAULT_HOST.to_string());
        let port = env::var("CLINIC_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let jwt_secret = env::var("CLINIC_JWT_SECRET")
            .or_else(|_| env::var("SECRET_KEY"))
            .map_err(|_| {
                ClinicError::ConfigError(
                    "CLINIC_JWT_SECRET environment variable is required for security. \
                     Generate one with: openssl rand -base64 32"
                        .to_string(),
                )
            })?;
        Self::validate_jwt_secret(&jwt_secret)?;

        let ttl_minutes = match env::var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Ok(raw) => raw.parse::<u64>().ok().filter(|m| *m > 0).ok_or_else(|| {
                ClinicError::ConfigError(format!(
                    "ACCESS_TOKEN_EXPIRE_MINUTES must be a positive integer, got '{}'",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_TOKEN_TTL_MINUTES as u64,
        };

        let storage = Self::storage_from_env()?;
        let image_bucket =
            env::var("CLINIC_IMAGE_BUCKET").unwrap_or_else(|_| DEFAULT_IMAGE_BUCKET.to_string());

        Ok(Self {
            host,
            port,
            jwt_secret,
            token_ttl: Duration::from_secs(ttl_minutes * 60),
            storage,
            image_bucket,
        })
    }
}
