// models/src/medical/patient.rs

use serde::{Deserialize, Serialize};

use crate::errors::ValidationResult;
use crate::validation::{check_email, check_length, check_min_length};

pub const NAME_MAX_LEN: usize = 100;
pub const PASSWORD_MIN_LEN: usize = 6;

/// A stored patient document, password hash included.
///
/// Never serialize this to a client; use [`Patient::profile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl Patient {
    /// The public projection of this patient.
    pub fn profile(&self) -> PatientProfile {
        PatientProfile {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// What clients may see of a patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientProfile {
    pub name: String,
    pub email: String,
}

/// A patient list entry: the profile plus how many records hang off it.
///
/// `appointments` and `prescriptions` are arrays of `null`, one per record;
/// existing clients read their lengths. The `_count` fields carry the same
/// numbers directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientSummary {
    #[serde(flatten)]
    pub profile: PatientProfile,
    pub appointment_count: usize,
    pub prescription_count: usize,
    pub appointments: Vec<()>,
    pub prescriptions: Vec<()>,
}

impl PatientSummary {
    pub fn new(profile: PatientProfile, appointment_count: usize, prescription_count: usize) -> Self {
        Self {
            profile,
            appointment_count,
            prescription_count,
            appointments: vec![(); appointment_count],
            prescriptions: vec![(); prescription_count],
        }
    }
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewPatient {
    pub fn validate(&self) -> ValidationResult<()> {
        check_length("name", &self.name, 1, NAME_MAX_LEN)?;
        check_email("email", &self.email)?;
        check_min_length("password", &self.password, PASSWORD_MIN_LEN)
    }
}

/// Partial update payload. A field sent as `null` counts as not sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl PatientUpdate {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            check_length("name", name, 1, NAME_MAX_LEN)?;
        }
        if let Some(email) = &self.email {
            check_email("email", email)?;
        }
        if let Some(password) = &self.password {
            check_min_length("password", password, PASSWORD_MIN_LEN)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

/// A patient update ready for the store; the password is already hashed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl PatientChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password_hash.is_none()
    }

    /// Applies the present fields; returns whether anything changed.
    pub fn apply_to(&self, patient: &mut Patient) -> bool {
        let before = patient.clone();
        if let Some(name) = &self.name {
            patient.name = name.clone();
        }
        if let Some(email) = &self.email {
            patient.email = email.clone();
        }
        if let Some(hash) = &self.password_hash {
            patient.password_hash = hash.clone();
        }
        *patient != before
    }
}
