//! Argon2 password hashing shared by the storefront, admin and CLI.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (bounds hashing cost).
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Password validation and hashing errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// Password does not meet length requirements.
    #[error(
        "password must be between {} and {} characters",
        MIN_PASSWORD_LENGTH,
        MAX_PASSWORD_LENGTH
    )]
    InvalidLength,
    /// The stored hash could not be parsed or the hasher failed.
    #[error("password hashing failed")]
    Hash,
    /// Password does not match the stored hash.
    #[error("password does not match")]
    Mismatch,
}

/// Check password length requirements.
///
/// # Errors
///
/// Returns `PasswordError::InvalidLength` if the password is too short or too long.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len) {
        Ok(())
    } else {
        Err(PasswordError::InvalidLength)
    }
}

/// Hash a password with Argon2id and a random salt.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)
}

/// Verify a password against a stored PHC hash string.
///
/// # Errors
///
/// Returns `PasswordError::Mismatch` if the password is wrong, or
/// `PasswordError::Hash` if the stored hash is malformed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::Hash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| PasswordError::Mismatch)
}
