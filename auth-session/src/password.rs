//! Adaptive one-way password hashing.
//!
//! Argon2id with per-hash random salts and the library's default cost
//! parameters. Verification is constant-time; a mismatch is a normal `false`
//! result, while a malformed stored hash is an internal error. Callers must
//! collapse both to a uniform unauthorized response.

use crate::error::{AuthError, Result};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordVerifier};

#[derive(Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2::PasswordHasher::hash_password(&self.argon2, plaintext.as_bytes(), &salt)
            .map_err(|_| AuthError::Hashing)?
            .to_string();
        Ok(hash)
    }

    /// Returns `Ok(false)` on mismatch; only a hash that cannot be parsed is
    /// an error.
    pub fn verify(&self, hash: &str, plaintext: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::Hashing)?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::Hashing),
        }
    }
}
