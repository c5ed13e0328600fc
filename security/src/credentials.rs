// security/src/credentials.rs

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};

use once_cell::sync::Lazy;

use crate::AuthError;

const MISSING_ACCOUNT_PASSWORD: &str = "clinic-portal-missing-account";

/// Stand-in hash verified against when a login names no account.
static MISSING_ACCOUNT_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password(MISSING_ACCOUNT_PASSWORD).ok());

/// Hashes a password with Argon2id and a fresh random salt.
///
/// The result is a self-describing PHC string suitable for storage.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHashError(format!("Failed to hash password with Argon2: {}", e)))
}

/// Verifies a password against a stored hash.
///
/// A malformed hash is treated like a mismatch.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match PasswordHash::new(hashed_password) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Does the work of [`verify_password`] for a login whose account does not
/// exist, so both failures take as long. Always `false`.
pub fn verify_missing_account(password: &str) -> bool {
    if let Some(hash) = MISSING_ACCOUNT_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}
