//! Password hashing with Argon2id.
//!
//! Plaintext passwords never leave this module: callers hand in the
//! submitted string and get back a [`PasswordDigest`] holding the PHC
//! string (algorithm, parameters, salt and hash).

use core::fmt;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Errors from password hashing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// The submitted password is empty.
    #[error("password cannot be empty")]
    Empty,
    /// The hasher failed.
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// A salted Argon2id password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::Empty` for an empty password, or
    /// `PasswordError::Hash` if Argon2 fails.
    pub fn hash(password: &str) -> Result<Self, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::Empty);
        }

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;

        Ok(Self(hash.to_string()))
    }

    /// Wrap a stored PHC string without re-hashing.
    #[must_use]
    pub const fn from_phc(phc: String) -> Self {
        Self(phc)
    }

    /// Check a plaintext password against this digest.
    ///
    /// A malformed stored digest never verifies.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.0) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Returns the PHC string for storage.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest([REDACTED])")
    }
}
