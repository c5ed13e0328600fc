// security/src/lib.rs

//! Credential hashing and bearer tokens.
//!
//! Both halves are pure: nothing here touches the store. Callers that
//! resolve a token are responsible for checking that its subject still
//! exists.

use std::fmt;

pub mod credentials;
pub mod tokens;

pub use credentials::{hash_password, verify_missing_account, verify_password};
pub use tokens::{Claims, TokenService, DEFAULT_TOKEN_TTL_HOURS};

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Email unknown or password mismatch; the two are not told apart.
    InvalidCredentials,
    /// The token is malformed, its signature does not verify, or it names no subject.
    InvalidToken,
    /// The token verified but its expiry is in the past.
    ExpiredToken,
    PasswordHashError(String),
    JwtError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::InvalidToken | AuthError::ExpiredToken => write!(f, "Invalid or expired token"),
            AuthError::PasswordHashError(msg) => write!(f, "Password hashing error: {}", msg),
            AuthError::JwtError(msg) => write!(f, "JWT error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}
