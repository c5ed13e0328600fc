// models/src/medical/appointment.rs

use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};
use crate::identifiers::RecordId;
use crate::medical::recurrence::Recurrence;
use crate::patch::Patch;
use crate::validation::check_length;

pub const PROVIDER_MAX_LEN: usize = 200;

/// A scheduled visit owned by one patient.
///
/// `datetime` and `end_date` are kept verbatim; no calendar checks are made
/// and nothing ties `end_date` to `datetime`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub patient_id: RecordId,
    pub provider: String,
    pub datetime: String,
    pub repeat: Recurrence,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    pub provider: String,
    pub datetime: String,
    pub repeat: Recurrence,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl NewAppointment {
    pub fn validate(&self) -> ValidationResult<()> {
        check_length("provider", &self.provider, 1, PROVIDER_MAX_LEN)
    }

    pub fn into_appointment(self, patient_id: RecordId) -> Appointment {
        Appointment {
            patient_id,
            provider: self.provider,
            datetime: self.datetime,
            repeat: self.repeat,
            end_date: self.end_date,
        }
    }
}

/// Partial update payload.
///
/// `provider`, `datetime` and `repeat` ignore an explicit `null`;
/// `end_date: null` clears the stored end date.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentUpdate {
    #[serde(default)]
    pub provider: Patch<String>,
    #[serde(default)]
    pub datetime: Patch<String>,
    #[serde(default)]
    pub repeat: Patch<Recurrence>,
    #[serde(default)]
    pub end_date: Patch<String>,
}

impl AppointmentUpdate {
    pub fn has_changes(&self) -> bool {
        self.provider.is_value()
            || self.datetime.is_value()
            || self.repeat.is_value()
            || self.end_date.is_present()
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(provider) = self.provider.value() {
            check_length("provider", provider, 1, PROVIDER_MAX_LEN)?;
        }
        if !self.has_changes() {
            return Err(ValidationError::EmptyUpdate);
        }
        Ok(())
    }

    /// Applies the present fields; returns whether anything changed.
    pub fn apply_to(&self, appointment: &mut Appointment) -> bool {
        let before = appointment.clone();
        if let Some(provider) = self.provider.value() {
            appointment.provider = provider.clone();
        }
        if let Some(datetime) = self.datetime.value() {
            appointment.datetime = datetime.clone();
        }
        if let Some(repeat) = self.repeat.value() {
            appointment.repeat = *repeat;
        }
        match &self.end_date {
            Patch::Absent => {}
            Patch::Null => appointment.end_date = None,
            Patch::Value(end_date) => appointment.end_date = Some(end_date.clone()),
        }
        *appointment != before
    }
}
