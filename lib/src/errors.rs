// lib/src/errors.rs

use bincode::error::{DecodeError, EncodeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// A unique index already holds the value.
    #[error("Already Exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid input or data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::DatabaseError(err.to_string())
    }
}

impl From<EncodeError> for StorageError {
    fn from(err: EncodeError) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}

impl From<DecodeError> for StorageError {
    fn from(err: DecodeError) -> Self {
        StorageError::DeserializationError(err.to_string())
    }
}

impl From<security::AuthError> for StorageError {
    fn from(err: security::AuthError) -> Self {
        StorageError::InternalError(err.to_string())
    }
}
