// models/src/medical/prescription.rs

use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};
use crate::identifiers::RecordId;
use crate::medical::recurrence::Recurrence;
use crate::validation::{check_min_length, check_minimum};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub patient_id: RecordId,
    pub medication: String,
    pub dosage: String,
    pub quantity: i64,
    pub refill_on: String,
    pub refill_schedule: Recurrence,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPrescription {
    pub medication: String,
    pub dosage: String,
    pub quantity: i64,
    pub refill_on: String,
    pub refill_schedule: Recurrence,
}

impl NewPrescription {
    pub fn validate(&self) -> ValidationResult<()> {
        check_min_length("medication", &self.medication, 1)?;
        check_min_length("dosage", &self.dosage, 1)?;
        check_minimum("quantity", self.quantity, 1)
    }

    pub fn into_prescription(self, patient_id: RecordId) -> Prescription {
        Prescription {
            patient_id,
            medication: self.medication,
            dosage: self.dosage,
            quantity: self.quantity,
            refill_on: self.refill_on,
            refill_schedule: self.refill_schedule,
        }
    }
}

/// Partial update payload. A field sent as `null` counts as not sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrescriptionUpdate {
    pub medication: Option<String>,
    pub dosage: Option<String>,
    pub quantity: Option<i64>,
    pub refill_on: Option<String>,
    pub refill_schedule: Option<Recurrence>,
}

impl PrescriptionUpdate {
    pub fn has_changes(&self) -> bool {
        self.medication.is_some()
            || self.dosage.is_some()
            || self.quantity.is_some()
            || self.refill_on.is_some()
            || self.refill_schedule.is_some()
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(medication) = &self.medication {
            check_min_length("medication", medication, 1)?;
        }
        if let Some(dosage) = &self.dosage {
            check_min_length("dosage", dosage, 1)?;
        }
        if let Some(quantity) = self.quantity {
            check_minimum("quantity", quantity, 1)?;
        }
        if !self.has_changes() {
            return Err(ValidationError::EmptyUpdate);
        }
        Ok(())
    }

    pub fn apply_to(&self, prescription: &mut Prescription) -> bool {
        let before = prescription.clone();
        if let Some(medication) = &self.medication {
            prescription.medication = medication.clone();
        }
        if let Some(dosage) = &self.dosage {
            prescription.dosage = dosage.clone();
        }
        if let Some(quantity) = self.quantity {
            prescription.quantity = quantity;
        }
        if let Some(refill_on) = &self.refill_on {
            prescription.refill_on = refill_on.clone();
        }
        if let Some(schedule) = self.refill_schedule {
            prescription.refill_schedule = schedule;
        }
        *prescription != before
    }
}
