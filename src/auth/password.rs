//! Salted one-way hashing of user secrets
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$digest`),
//! so the algorithm, cost and salt travel with the digest.

use argon2::password_hash::{
    Error as PhcError, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::Argon2;
use rand::rngs::OsRng;

use crate::constants::MAX_SECRET_LEN;
use crate::error::{ClinicError, Result};

/// Hashes and verifies user secrets
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a secret under a fresh random salt
    pub fn hash(&self, secret: &str) -> Result<String> {
        if secret.is_empty() {
            return Err(ClinicError::InvalidInput("La contraseña no puede estar vacía".to_string()));
        }
        if secret.len() > MAX_SECRET_LEN {
            return Err(ClinicError::InvalidInput(format!(
                "La contraseña no puede superar {} bytes",
                MAX_SECRET_LEN
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ClinicError::InvalidInput(format!("Failed to hash secret: {}", e)))
    }

    /// Check a secret against a stored hash.
    ///
    /// The digest comparison inside `argon2` is constant-time. Returns
    /// `Ok(false)` on mismatch and `MalformedHash` only when `stored` cannot be
    /// parsed or names an algorithm this hasher does not run.
    pub fn verify(&self, secret: &str, stored: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| ClinicError::MalformedHash(e.to_string()))?;

        // Nothing longer than the limit was ever hashed
        if secret.len() > MAX_SECRET_LEN {
            return Ok(false);
        }

        match self.argon2.verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PhcError::Password) => Ok(false),
            Err(e) => Err(ClinicError::MalformedHash(e.to_string())),
        }
    }

    /// `hash` on the blocking pool, keeping the executor free for token checks
    pub async fn hash_off_thread(&self, secret: String) -> Result<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&secret)).await?
    }

    /// `verify` on the blocking pool
    pub async fn verify_off_thread(&self, secret: String, stored: String) -> Result<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&secret, &stored)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_self_describing() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("perro-gato-123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("perro-gato-123"));
    }

    #[test]
    fn test_empty_and_oversized_secrets_rejected() {
        let hasher = PasswordHasher::new();
        assert!(matches!(hasher.hash(""), Err(ClinicError::InvalidInput(_))));

        let long = "a".repeat(MAX_SECRET_LEN + 1);
        assert!(matches!(hasher.hash(&long), Err(ClinicError::InvalidInput(_))));

        let limit = "a".repeat(MAX_SECRET_LEN);
        assert!(hasher.hash(&limit).is_ok());
    }

    #[test]
    fn test_unparseable_hash_is_malformed() {
        let hasher = PasswordHasher::new();
        let result = hasher.verify("whatever", "not-a-phc-string");
        assert!(matches!(result, Err(ClinicError::MalformedHash(_))));
    }

    #[tokio::test]
    async fn test_off_thread_round_trip() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_off_thread("clave-segura".to_string()).await.unwrap();
        assert!(hasher
            .verify_off_thread("clave-segura".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!hasher
            .verify_off_thread("otra".to_string(), hash)
            .await
            .unwrap());
    }
}
