//! Password hashing and verification.
//!
//! Stored credentials are Argon2id PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`).
//! Every hash carries its own random salt, so the same password never produces the
//! same stored value twice. Verification recomputes the digest with the parameters
//! embedded in the PHC string and compares in constant time.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("invalid argon2 parameters: {0}")]
    InvalidParams(argon2::Error),
    #[error("failed to hash credential: {0}")]
    HashingFailure(argon2::password_hash::Error),
}

#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Argon2id with the library default cost (19 MiB, 2 iterations, 1 lane).
    #[must_use]
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }

    /// Argon2id with explicit cost parameters.
    ///
    /// # Errors
    /// Returns an error if argon2 rejects the parameter combination.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, HashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(HashError::InvalidParams)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext credential with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error only if the salt cannot be drawn or argon2 fails internally.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(HashError::HashingFailure)
    }

    /// Check a plaintext credential against a stored PHC string.
    ///
    /// Malformed stored values are treated as a mismatch.
    #[must_use]
    pub fn verify(&self, stored: &str, plaintext: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("algorithm", &"argon2id")
            .finish()
    }
}
