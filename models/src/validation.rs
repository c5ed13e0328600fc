// models/src/validation.rs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ValidationError, ValidationResult};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email pattern is valid")
});

/// Checks that `value` has between `min` and `max` characters (inclusive).
pub fn check_length(field: &'static str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::InvalidLength { field, min, max });
    }
    Ok(())
}

/// Checks that `value` has at least `min` characters.
pub fn check_min_length(field: &'static str, value: &str, min: usize) -> ValidationResult<()> {
    if value.chars().count() < min {
        return Err(ValidationError::TooShort { field, min });
    }
    Ok(())
}

pub fn check_email(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.len() > 254 || !EMAIL_RE.is_match(value) {
        return Err(ValidationError::InvalidEmail { field });
    }
    Ok(())
}

pub fn check_minimum(field: &'static str, value: i64, min: i64) -> ValidationResult<()> {
    if value < min {
        return Err(ValidationError::BelowMinimum { field, min });
    }
    Ok(())
}
