// models/src/identifiers.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationResult};

/// Identifier of a stored record.
///
/// Clients only ever see the hyphenated string form. Anything arriving from
/// a path segment or payload must go through [`RecordId::parse`] before it
/// is used as a lookup key.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a client-supplied identifier.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidIdentifier(label)` when `value` is not
    /// a well-formed identifier. `label` names the identifier in the error,
    /// e.g. `"patient ID"`.
    pub fn parse(value: &str, label: &'static str) -> ValidationResult<Self> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| ValidationError::InvalidIdentifier(label))
    }

    /// Rebuilds an identifier from its 16-byte storage key.
    pub fn from_key(bytes: &[u8]) -> Option<Self> {
        Uuid::from_slice(bytes).ok().map(Self)
    }

    /// The 16-byte storage key.
    pub fn as_key(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for RecordId {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        Self::parse(s, "ID")
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.to_string()
    }
}
