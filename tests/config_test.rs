//! Environment-driven configuration

use std::env;
use std::time::Duration;
use vet_clinic::config::{ServerConfig, StorageBackend};

const VARS: [&str; 9] = [
    "CLINIC_HOST",
    "CLINIC_PORT",
    "CLINIC_JWT_SECRET",
    "SECRET_KEY",
    "ACCESS_TOKEN_EXPIRE_MINUTES",
    "CLINIC_STORAGE_BACKEND",
    "SUPABASE_URL",
    "SUPABASE_KEY",
    "CLINIC_IMAGE_BUCKET",
];

const GOOD_SECRET: &str = "k9Zq2vX7pL4mN8rT1wY6sB3cF5hJ0dGa";

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

// Environment variables are process-wide, so every case runs in one test
#[test]
fn test_from_env_cases() {
    let saved: Vec<(&str, Option<String>)> = VARS.iter().map(|v| (*v, env::var(v).ok())).collect();

    // Missing secret
    clear_env();
    env::set_var("CLINIC_STORAGE_BACKEND", "memory");
    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("CLINIC_JWT_SECRET"));

    // Insecure secret
    env::set_var("CLINIC_JWT_SECRET", "changeme-changeme-changeme-changeme-1");
    assert!(ServerConfig::from_env().is_err());

    // Defaults with the memory backend
    env::set_var("CLINIC_JWT_SECRET", GOOD_SECRET);
    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 3030);
    assert_eq!(config.token_ttl, Duration::from_secs(30 * 60));
    assert_eq!(config.storage, StorageBackend::Memory);
    assert_eq!(config.image_bucket, "images");

    // SECRET_KEY is accepted as a fallback
    env::remove_var("CLINIC_JWT_SECRET");
    env::set_var("SECRET_KEY", GOOD_SECRET);
    env::set_var("ACCESS_TOKEN_EXPIRE_MINUTES", "5");
    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.jwt_secret, GOOD_SECRET);
    assert_eq!(config.token_ttl, Duration::from_secs(300));

    // Zero lifetime is refused
    env::set_var("ACCESS_TOKEN_EXPIRE_MINUTES", "0");
    assert!(ServerConfig::from_env().is_err());
    env::remove_var("ACCESS_TOKEN_EXPIRE_MINUTES");

    // The rest backend needs its URL and key
    env::set_var("CLINIC_STORAGE_BACKEND", "rest");
    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("SUPABASE_URL"));

    env::set_var("SUPABASE_URL", "not a url");
    env::set_var("SUPABASE_KEY", "service-key");
    assert!(ServerConfig::from_env().is_err());

    env::set_var("SUPABASE_URL", "https://clinic.supabase.co");
    let config = ServerConfig::from_env().unwrap();
    match config.storage {
        StorageBackend::Rest { url, api_key } => {
            assert_eq!(url.host_str(), Some("clinic.supabase.co"));
            assert_eq!(api_key, "service-key");
        }
        StorageBackend::Memory => panic!("expected the rest backend"),
    }

    env::set_var("CLINIC_STORAGE_BACKEND", "sqlite");
    assert!(ServerConfig::from_env().is_err());

    // Restore original environment
    clear_env();
    for (var, value) in saved {
        if let Some(value) = value {
            env::set_var(var, value);
        }
    }
}
