//! Password hashing with Argon2.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...$salt$hash`), so the salt and
//! cost parameters travel with the hash and verification needs nothing else.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct CredentialHasher {
    max_password_bytes: usize,
}

impl CredentialHasher {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            max_password_bytes: config.max_password_bytes,
        }
    }

    /// Hash a plaintext password.
    ///
    /// Fails with [`AppError::Hashing`] when the input is longer than the
    /// configured limit or the primitive rejects it.
    pub fn hash(&self, plaintext: &str) -> AppResult<String> {
        if plaintext.len() > self.max_password_bytes {
            return Err(AppError::Hashing(format!(
                "Password exceeds {} bytes",
                self.max_password_bytes
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AppError::Hashing(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A mismatch is `false`, and so is a stored value that is not a valid PHC string.
    pub fn verify(&self, hashed: &str, plaintext: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hashed) else {
            tracing::warn!("Stored password hash could not be parsed");
            return false;
        };

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }
}
