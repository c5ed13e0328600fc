// models/src/patch.rs

use serde::{Deserialize, Deserializer};

/// A partially-updatable field that remembers whether it was sent at all.
///
/// `Option<T>` cannot tell `{"end_date": null}` apart from `{}`; this can.
/// Fields of this type must carry `#[serde(default)]` so that a missing key
/// deserializes to [`Patch::Absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// The key was not present in the payload.
    Absent,
    /// The key was present with an explicit `null`.
    Null,
    /// The key was present with a value.
    Value(T),
}

impl<T> Patch<T> {
    /// True unless the key was missing from the payload.
    pub fn is_present(&self) -> bool {
        !matches!(self, Patch::Absent)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Patch::Value(_))
    }

    /// The supplied value, if any; `Null` and `Absent` both yield `None`.
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}
