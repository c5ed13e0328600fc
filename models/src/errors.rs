// models/src/errors.rs

pub use thiserror::Error;

/// A validation error raised while checking client-supplied input.
///
/// The `Display` output is shown to API clients verbatim, so every variant
/// names the offending field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An identifier could not be parsed as a record identifier.
    #[error("Invalid {0}")]
    InvalidIdentifier(&'static str),
    /// A string field is shorter or longer than allowed.
    #[error("{field} must be between {min} and {max} characters")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
    },
    /// A string field is shorter than allowed and has no upper bound.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    /// The value is not a syntactically valid email address.
    #[error("{field} is not a valid email address")]
    InvalidEmail { field: &'static str },
    /// A numeric field is below its lower bound.
    #[error("{field} must be greater than or equal to {min}")]
    BelowMinimum { field: &'static str, min: i64 },
    /// A partial update carried no recognised field.
    #[error("No fields to update")]
    EmptyUpdate,
}

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;
