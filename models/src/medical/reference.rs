// models/src/medical/reference.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The named pick-lists offered to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Medications,
    Dosages,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 2] = [ReferenceKind::Medications, ReferenceKind::Dosages];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Medications => "medications",
            ReferenceKind::Dosages => "dosages",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "medications" => Ok(ReferenceKind::Medications),
            "dosages" => Ok(ReferenceKind::Dosages),
            _ => Err(format!("Unknown reference type: {}", s)),
        }
    }
}

/// A stored pick-list. Read-only to the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceList {
    pub kind: ReferenceKind,
    pub values: Vec<String>,
}
