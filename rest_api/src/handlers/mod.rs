// rest_api/src/handlers/mod.rs

pub mod appointments;
pub mod auth;
pub mod health;
pub mod patients;
pub mod prescriptions;
pub mod reference;

use crate::errors::ApiError;

/// Argon2 is deliberately slow; keep it off the async workers.
pub(crate) async fn hash_password_blocking(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || security::hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {}", e)))?
        .map_err(ApiError::from)
}

pub(crate) async fn verify_password_blocking(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || security::verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("password verification task failed: {}", e)))
}

pub(crate) async fn verify_missing_account_blocking(password: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || security::verify_missing_account(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("password verification task failed: {}", e)))
}

pub(crate) async fn not_found_handler() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}
