//! Room password policy and hashing.
//!
//! Room passwords are stored as salted argon2 hashes in PHC string format
//! and verified on join. The cleartext is never persisted anywhere; the
//! shareable secret stays with whoever created the room.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{Result, RoomError};

/// Minimum accepted room password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 3;

/// Validates a submitted room password against the policy.
///
/// # Errors
///
/// Returns [`RoomError::MissingField`] for an empty password and
/// [`RoomError::PasswordTooShort`] below [`MIN_PASSWORD_LEN`].
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(RoomError::MissingField { field: "password" });
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(RoomError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Hashes a room password with a fresh random salt.
///
/// # Errors
///
/// Returns [`RoomError::PasswordHash`] if the hasher fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| RoomError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verifies a submitted password against a stored PHC hash string.
///
/// Returns `Ok(false)` on a plain mismatch; only an unparseable stored
/// hash is an error.
///
/// # Errors
///
/// Returns [`RoomError::PasswordHash`] if the stored hash is not a valid
/// PHC string.
pub fn verify_password(stored_hash: &str, candidate: &str) -> Result<bool> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| RoomError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok())
}
