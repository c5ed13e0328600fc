// models/src/medical/recurrence.rs

use serde::{Deserialize, Serialize};

/// How often an appointment repeats or a prescription is refilled.
///
/// Stored as-is; occurrences are never expanded from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        }
    }
}
